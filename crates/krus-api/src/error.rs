use thiserror::Error;

/// Error from the remote collection service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an authoritative answer (DNS failure,
    /// connection refused, malformed response body).
    #[error("network error: {0}")]
    Transport(String),

    /// The authority answered with a failure status. The message is the
    /// response body; mapping statuses to user-facing text is the caller's
    /// concern.
    #[error("api error ({status}): {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// HTTP status code, if the authority answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Status {
            status: 404,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Status {
            status: 401,
            message: message.into(),
        }
    }
}
