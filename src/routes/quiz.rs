use super::segment;
use crate::services::fetch_service::ApiRequest;
use serde_json::Value as JsonValue;

pub fn get_quiz(job_id: &str) -> ApiRequest {
    ApiRequest::get(format!("/api/quiz/{}/", segment(job_id)))
}

pub fn generate_quiz(job_id: &str, body: JsonValue) -> Vec<ApiRequest> {
    let job = segment(job_id);
    vec![
        ApiRequest::post(format!("/api/quiz/{}/generate/", job), body.clone()),
        ApiRequest::post(format!("/api/quiz/generate/{}/", job), body),
    ]
}

pub fn submit_attempt(job_id: &str, body: JsonValue) -> Vec<ApiRequest> {
    vec![
        ApiRequest::post("/api/quiz/attempt/", body.clone()),
        ApiRequest::post(format!("/api/quiz/{}/attempt/", segment(job_id)), body),
    ]
}

/// Path-parameterized, `job_id` query, then `job` (+ `candidate`) query.
pub fn attempt_history(job_id: &str, candidate_id: Option<&str>) -> Vec<ApiRequest> {
    let mut by_job_and_candidate = ApiRequest::get("/api/quiz/attempts/").with_query("job", job_id);
    if let Some(candidate) = candidate_id {
        by_job_and_candidate = by_job_and_candidate.with_query("candidate", candidate);
    }
    vec![
        ApiRequest::get(format!("/api/quiz/{}/attempts/", segment(job_id))),
        ApiRequest::get("/api/quiz/attempts/").with_query("job_id", job_id),
        by_job_and_candidate,
    ]
}
