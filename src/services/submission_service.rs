use crate::dto::quiz_dto::{interpret_verdict, SubmitAttemptRequest};
use crate::error::{Error, Result};
use crate::models::attempt::AnswerMap;
use crate::models::attempt_result::Verdict;
use crate::routes;
use crate::services::fetch_service::ResilientFetch;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SubmissionService {
    fetch: ResilientFetch,
}

impl SubmissionService {
    pub fn new(fetch: ResilientFetch) -> Self {
        Self { fetch }
    }

    /// Posts `{job_id, answers}` to the primary submit endpoint, then the per-job shape.
    pub async fn submit(&self, job_id: &str, answers: &AnswerMap) -> Result<Verdict> {
        let payload = serde_json::to_value(SubmitAttemptRequest::new(job_id, answers.clone()))?;
        let candidates = routes::quiz::submit_attempt(job_id, payload);

        let response = self.fetch.call(&candidates).await?.into_success().map_err(|e| {
            warn!(job_id, error = %e, "Quiz submission failed on every endpoint");
            e
        })?;

        let body = response
            .data
            .ok_or_else(|| Error::MalformedResponse("submit response has no body".to_string()))?;
        let verdict = interpret_verdict(&body)?;

        match &verdict {
            Verdict::Graded(result) => {
                info!(job_id, status = ?result.status, score = ?result.score, "Quiz attempt graded")
            }
            Verdict::ScoreOnly { score, .. } => {
                info!(job_id, score = ?score, "Quiz attempt scored without verdict")
            }
        }
        Ok(verdict)
    }
}
