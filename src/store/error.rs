// ABOUTME: Errors reported by remote file store operations.
// ABOUTME: Classifies HTTP responses into not-found, conflict, server, and client failures.

/// Errors from remote file store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("revision conflict on {path}: {message}")]
    Conflict { path: String, message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("{}", client_display(*status, message))]
    Client {
        status: Option<u16>,
        message: String,
    },
}

fn client_display(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("request failed ({status}): {message}"),
        None => format!("request failed: {message}"),
    }
}

impl StoreError {
    /// Map a non-success HTTP status to the matching variant.
    pub fn from_status(status: u16, path: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => StoreError::NotFound {
                path: path.to_string(),
            },
            409 => StoreError::Conflict {
                path: path.to_string(),
                message,
            },
            500..=599 => StoreError::Server { status, message },
            _ => StoreError::Client {
                status: Some(status),
                message,
            },
        }
    }

    /// Transport-level failure with no HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        StoreError::Client {
            status: None,
            message: message.into(),
        }
    }

    /// The status indicator observed for this failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::NotFound { .. } => Some(404),
            StoreError::Conflict { .. } => Some(409),
            StoreError::Server { status, .. } => Some(*status),
            StoreError::Client { status, .. } => *status,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StoreError::Client {
                status: Some(status.as_u16()),
                message: err.to_string(),
            },
            None => StoreError::transport(err.to_string()),
        }
    }
}
