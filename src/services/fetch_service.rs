use crate::error::{Error, Result};
use crate::routes;
use crate::services::credential_service::CredentialStore;
use crate::services::transport::{PreparedRequest, RawResponse, Transport};
use crate::utils::collection::{is_recognizable_collection, text_field};
use crate::utils::token::authorization_header;
use reqwest::Method;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// One candidate request descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub timeout: Option<Duration>,
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
            authenticated: true,
        }
    }

    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Normalized response: `ok` mirrors a 2xx status, `data` is parsed JSON or the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Option<JsonValue>,
}

impl ApiResponse {
    pub fn exhausted(status: u16) -> Self {
        Self {
            ok: false,
            status,
            data: None,
        }
    }

    fn from_raw(raw: RawResponse) -> Self {
        let is_json = raw
            .content_type
            .as_deref()
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);
        let data = if raw.body.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<JsonValue>(&raw.body) {
                Ok(value) => Some(value),
                Err(_) if is_json => {
                    debug!(status = raw.status, "Body declared JSON but did not parse");
                    Some(JsonValue::String(raw.body))
                }
                Err(_) => Some(JsonValue::String(raw.body)),
            }
        };
        Self {
            ok: (200..300).contains(&raw.status),
            status: raw.status,
            data,
        }
    }

    /// The error a non-ok response stands for.
    pub fn failure(&self) -> Error {
        match self.status {
            0 => Error::Network("all endpoints unreachable".to_string()),
            status => Error::Status(status),
        }
    }

    pub fn into_success(self) -> Result<Self> {
        if self.ok {
            Ok(self)
        } else {
            Err(self.failure())
        }
    }
}

/// Ordered-URL resolution over a pluggable transport.
#[derive(Clone)]
pub struct ResilientFetch {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    base_url: Url,
    /// Held across a whole refresh so clones never spend the same refresh token twice.
    refresh_lock: Arc<Mutex<()>>,
}

impl ResilientFetch {
    pub fn new(
        api_root: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self> {
        let mut base_url = Url::parse(api_root)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            transport,
            credentials,
            base_url,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn resolve(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.join(request.path.trim_start_matches('/'))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Tries each candidate in order and stops at the first 2xx or recognizable collection.
    /// A 401/403 ends the whole sequence with `Error::Auth`; exhaustion yields `ok: false`
    /// with the last seen status (0 when nothing answered).
    pub async fn call(&self, candidates: &[ApiRequest]) -> Result<ApiResponse> {
        let mut last: Option<ApiResponse> = None;

        for request in candidates {
            match self.send(request).await {
                Ok(response) => {
                    let usable = response.ok
                        || response
                            .data
                            .as_ref()
                            .map(is_recognizable_collection)
                            .unwrap_or(false);
                    if usable {
                        debug!(path = %request.path, status = response.status, "Endpoint accepted");
                        return Ok(response);
                    }
                    debug!(
                        path = %request.path,
                        status = response.status,
                        "Endpoint rejected, trying next shape"
                    );
                    last = Some(response);
                }
                Err(Error::Auth(status)) => {
                    warn!(
                        path = %request.path,
                        status,
                        "Authorization required, stopping endpoint fallback"
                    );
                    return Err(Error::Auth(status));
                }
                Err(e) => {
                    warn!(path = %request.path, error = %e, "Endpoint request failed");
                }
            }
        }

        Ok(last.unwrap_or_else(|| ApiResponse::exhausted(0)))
    }

    pub async fn call_one(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.call(std::slice::from_ref(&request)).await
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut access = self.credentials.access_token();
        if request.authenticated && self.credentials.should_refresh() {
            self.refresh_access_token(access.as_deref()).await;
            access = self.credentials.access_token();
        }

        let mut raw = self.send_once(request, access.as_deref()).await?;
        if raw.status == 401 && request.authenticated {
            if let Some(fresh) = self.refresh_access_token(access.as_deref()).await {
                raw = self.send_once(request, Some(&fresh)).await?;
                access = Some(fresh);
            }
        }

        if raw.status == 401 || raw.status == 403 {
            self.credentials.clear_if_access(access.as_deref());
            return Err(Error::Auth(raw.status));
        }
        Ok(ApiResponse::from_raw(raw))
    }

    async fn send_once(&self, request: &ApiRequest, access: Option<&str>) -> Result<RawResponse> {
        let url = self.resolve(request)?;
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = access.filter(|_| request.authenticated) {
            headers.push(("Authorization".to_string(), authorization_header(token)));
        }
        let prepared = PreparedRequest {
            method: request.method.clone(),
            url: url.clone(),
            headers,
            body: request.body.clone(),
        };

        let pending = self.transport.execute(prepared);
        match request.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| Error::Network(format!("{} timed out after {:?}", url, limit)))?,
            None => pending.await,
        }
    }

    /// Single-flight refresh. `stale` is the access token the caller last sent; when the cache
    /// already holds a different one, another request refreshed first and that token is reused.
    /// Returns the new access token, or `None` once the refresh endpoints are exhausted.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.credentials.access_token();
        if current.is_some() && current.as_deref() != stale {
            debug!("Access token already refreshed by a concurrent request");
            return current;
        }
        let refresh = self.credentials.refresh_token()?;

        for request in routes::auth::token_refresh(&refresh) {
            let raw = match self.send_once(&request, None).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %request.path, error = %e, "Token refresh attempt failed");
                    continue;
                }
            };
            if raw.status == 404 || raw.status == 405 {
                continue;
            }
            let response = ApiResponse::from_raw(raw);
            if !response.ok {
                continue;
            }
            let Some(data) = response.data else {
                continue;
            };
            if let Some(access) = text_field(&data, &["access", "token", "access_token"]) {
                let rotated = text_field(&data, &["refresh", "refresh_token"]);
                self.credentials.save(access.clone(), rotated);
                info!(path = %request.path, "Access token refreshed");
                return Some(access);
            }
        }

        self.credentials.clear_if_refresh(&refresh);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::MockTransport;
    use serde_json::json;

    fn sent_auth(request: &PreparedRequest, value: &str) -> bool {
        request
            .headers
            .iter()
            .any(|(name, v)| name == "Authorization" && v == value)
    }

    fn fetch_with(
        mock: MockTransport,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> ResilientFetch {
        let credentials = Arc::new(CredentialStore::new(
            access.map(str::to_string),
            refresh.map(str::to_string),
        ));
        ResilientFetch::new("http://backend.test", Arc::new(mock), credentials).unwrap()
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .withf(|r| r.url.path() == "/api/a/")
            .times(1)
            .returning(|_| Ok(RawResponse::json(404, json!({"detail": "nope"}))));
        mock.expect_execute()
            .withf(|r| r.url.path() == "/api/b/")
            .times(1)
            .returning(|_| Ok(RawResponse::json(200, json!({"ok": true}))));
        let fetch = fetch_with(mock, None, None);

        let response = fetch
            .call(&[
                ApiRequest::get("/api/a/"),
                ApiRequest::get("/api/b/"),
                ApiRequest::get("/api/c/"),
            ])
            .await
            .unwrap();
        assert!(response.ok);
        assert_eq!(response.data, Some(json!({"ok": true})));
    }

    #[tokio::test]
    async fn collection_body_is_usable_even_without_2xx() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(RawResponse::json(500, json!({"results": []}))));
        let fetch = fetch_with(mock, None, None);

        let response = fetch
            .call(&[ApiRequest::get("/a/"), ApiRequest::get("/b/")])
            .await
            .unwrap();
        assert!(!response.ok);
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn forbidden_short_circuits_and_clears_token() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(RawResponse::json(403, json!({"detail": "Forbidden"}))));
        let fetch = fetch_with(mock, Some("tok"), None);

        let err = fetch
            .call(&[ApiRequest::get("/a/"), ApiRequest::get("/b/")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(403)));
        assert!(!fetch.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn exhaustion_reports_last_status_or_zero() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .returning(|_| Err(Error::Network("connection refused".into())));
        let fetch = fetch_with(mock, None, None);
        let response = fetch.call(&[ApiRequest::get("/a/")]).await.unwrap();
        assert_eq!(response, ApiResponse::exhausted(0));

        let mut mock = MockTransport::new();
        mock.expect_execute()
            .returning(|_| Ok(RawResponse::json(404, json!({"detail": "missing"}))));
        let fetch = fetch_with(mock, None, None);
        let response = fetch
            .call(&[ApiRequest::get("/a/"), ApiRequest::get("/b/")])
            .await
            .unwrap();
        assert!(!response.ok);
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn unauthorized_refreshes_once_then_retries() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .withf(|r| r.url.path() == "/api/quiz/1/" && sent_auth(r, "Token stale"))
            .times(1)
            .returning(|_| Ok(RawResponse::json(401, json!({"detail": "expired"}))));
        mock.expect_execute()
            .withf(|r| r.url.path() == "/accounts/api/token/refresh/")
            .times(1)
            .returning(|_| Ok(RawResponse::json(404, json!({}))));
        mock.expect_execute()
            .withf(|r| r.url.path() == "/api/token/refresh/")
            .times(1)
            .returning(|_| Ok(RawResponse::json(200, json!({"access": "fresh"}))));
        mock.expect_execute()
            .withf(|r| r.url.path() == "/api/quiz/1/" && sent_auth(r, "Token fresh"))
            .times(1)
            .returning(|_| Ok(RawResponse::json(200, json!([]))));
        let fetch = fetch_with(mock, Some("stale"), Some("r"));

        let response = fetch.call_one(ApiRequest::get("/api/quiz/1/")).await.unwrap();
        assert!(response.ok);
        assert_eq!(fetch.credentials().access_token().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn non_json_bodies_are_kept_as_text() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .returning(|_| Ok(RawResponse::text(200, "text/html", "<li>row</li>")));
        let fetch = fetch_with(mock, None, None);
        let response = fetch.call_one(ApiRequest::get("/frag/")).await.unwrap();
        assert_eq!(response.data, Some(JsonValue::String("<li>row</li>".into())));
    }

    #[test]
    fn resolve_keeps_base_path_and_query() {
        let fetch = ResilientFetch::new(
            "http://backend.test/root",
            Arc::new(MockTransport::new()),
            Arc::new(CredentialStore::default()),
        )
        .unwrap();
        let url = fetch
            .resolve(&ApiRequest::get("/api/quiz/attempts/").with_query("job_id", "4"))
            .unwrap();
        assert_eq!(url.as_str(), "http://backend.test/root/api/quiz/attempts/?job_id=4");
    }
}
