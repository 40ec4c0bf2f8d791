#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl MirrorError {
    /// Transport failures, rate limits and server errors are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            MirrorError::Http(_) => true,
            MirrorError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
