use reqwest::StatusCode;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Every way a backend call can fail.
///
/// `status()` is `Some` whenever the server actually answered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RepositoryError {
    /// Build the error for a non-2xx answer. The message is the status text,
    /// falling back to the response body when the code has no reason phrase.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = status
            .canonical_reason()
            .map(str::to_owned)
            .unwrap_or_else(|| body.trim().to_owned());
        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. }
            | Self::Transport(message)
            | Self::Decode(message) => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_uses_reason_phrase() {
        let err = RepositoryError::from_status(StatusCode::NOT_FOUND, "{}");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "Not Found");
        assert_eq!(err.to_string(), "API error 404: Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = RepositoryError::Transport("connection refused".into());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
