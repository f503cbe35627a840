use crate::services::fetch_service::ApiRequest;
use serde_json::json;

const REFRESH_PATHS: &[&str] = &[
    "/accounts/api/token/refresh/",
    "/api/token/refresh/",
    "/accounts/token/refresh/",
    "/auth/token/refresh/",
];

pub fn token_refresh(refresh_token: &str) -> Vec<ApiRequest> {
    REFRESH_PATHS
        .iter()
        .map(|path| ApiRequest::post(*path, json!({ "refresh": refresh_token })).without_auth())
        .collect()
}
