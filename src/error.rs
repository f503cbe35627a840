pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authorization required (status {0})")]
    Auth(u16),

    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No questions available for job {0}")]
    NoQuestions(String),

    #[error("Score {score:?} reported without a pass/fail verdict")]
    AmbiguousVerdict { score: Option<f64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// Errors that status refreshes swallow instead of surfacing.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Error::Network(_)
                | Error::MalformedResponse(_)
                | Error::Status(_)
                | Error::Json(_)
                | Error::Reqwest(_)
        )
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Short message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(_) => "Authentication required".to_string(),
            Error::Network(_) | Error::Reqwest(_) => "Network error, please retry".to_string(),
            Error::NoQuestions(_) => "No questions available".to_string(),
            Error::Status(status) => format!("Request failed (status {})", status),
            Error::MalformedResponse(_) | Error::Json(_) => {
                "Unexpected response from server".to_string()
            }
            other => other.to_string(),
        }
    }
}
