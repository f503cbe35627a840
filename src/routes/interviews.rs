use super::segment;
use crate::services::fetch_service::ApiRequest;
use std::time::Duration;

pub fn candidate_invites() -> Vec<ApiRequest> {
    vec![
        ApiRequest::get("/api/interviews/candidate/invites/"),
        ApiRequest::get("/api/interviews/invites/"),
    ]
}

pub fn invite_fragment(invite_id: &str, timeout: Duration) -> ApiRequest {
    ApiRequest::get(format!(
        "/interviews/fragments/invite_row/{}/",
        segment(invite_id)
    ))
    .with_timeout(timeout)
}
