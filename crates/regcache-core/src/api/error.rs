use reqwest::StatusCode;
use thiserror::Error;

/// A failed exchange with the customer registry
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Registry rejected the access tokens")]
    Unauthorized,

    #[error("Registry refused access: {0}")]
    Forbidden(String),

    #[error("Customer not found in registry: {0}")]
    NotFound(String),

    #[error("Rate limited by the registry")]
    RateLimited,

    #[error("Registry returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Could not reach the registry: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected registry response: {0}")]
    MalformedBody(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = Self::truncate_body(body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(body),
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            _ => ApiError::Upstream { status, body },
        }
    }

    /// HTTP status the registry answered with, if it answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Upstream { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::MalformedBody(_) => None,
        }
    }
}
