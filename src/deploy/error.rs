// ABOUTME: Error taxonomy for manifest resolution and commit attempts.
// ABOUTME: Separates fatal failures from the retryable ones the engine absorbs.

use snafu::Snafu;

use crate::codec::CodecError;
use crate::store::StoreError;

/// Errors that can end or interrupt a deployment commit.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DeployError {
    /// The manifest or deployment settings do not define a valid target.
    #[snafu(display("configuration error: {message}"))]
    Configuration { message: String },

    /// The manifest could not be fetched from the store.
    #[snafu(display("failed to fetch manifest {path}: {source}"))]
    ManifestUnavailable { path: String, source: StoreError },

    /// The manifest was fetched but is not a valid manifest document.
    #[snafu(display("invalid manifest {path}: {source}"))]
    ManifestInvalid {
        path: String,
        source: serde_yaml::Error,
    },

    /// The existing target file is not a mapping document.
    #[snafu(display("cannot update {path}: {source}"))]
    UnsupportedDocument { path: String, source: CodecError },

    /// A store operation failed.
    #[snafu(display("{source}"))]
    Store { source: StoreError },

    /// Every attempt in the budget failed with a retryable error.
    #[snafu(display("giving up after {attempts} attempt(s): {source}"))]
    AttemptsExhausted {
        attempts: u32,
        source: Box<DeployError>,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Configuration,
    ManifestUnavailable,
    UnsupportedDocument,
    NotFound,
    Conflict,
    Server,
    Client,
    AttemptsExhausted,
}

impl DeployError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DeployError::Configuration {
            message: message.into(),
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Configuration { .. } | DeployError::ManifestInvalid { .. } => {
                DeployErrorKind::Configuration
            }
            DeployError::ManifestUnavailable { .. } => DeployErrorKind::ManifestUnavailable,
            DeployError::UnsupportedDocument { .. } => DeployErrorKind::UnsupportedDocument,
            DeployError::Store { source } => match source {
                StoreError::NotFound { .. } => DeployErrorKind::NotFound,
                StoreError::Conflict { .. } => DeployErrorKind::Conflict,
                StoreError::Server { .. } => DeployErrorKind::Server,
                StoreError::Client { .. } => DeployErrorKind::Client,
            },
            DeployError::AttemptsExhausted { .. } => DeployErrorKind::AttemptsExhausted,
        }
    }

    /// Whether the commit engine retries after this error.
    ///
    /// Server errors are fatal so a degraded backend is not hammered.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            DeployErrorKind::NotFound | DeployErrorKind::Conflict | DeployErrorKind::Client
        )
    }

    /// Status indicator observed from the store, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeployError::Store { source } | DeployError::ManifestUnavailable { source, .. } => {
                source.status()
            }
            DeployError::AttemptsExhausted { source, .. } => source.status(),
            _ => None,
        }
    }

    /// The error behind an exhausted attempt budget, or `self` otherwise.
    pub fn last_error(&self) -> &DeployError {
        match self {
            DeployError::AttemptsExhausted { source, .. } => source.as_ref(),
            other => other,
        }
    }
}

impl From<StoreError> for DeployError {
    fn from(source: StoreError) -> Self {
        DeployError::Store { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_and_client_errors_are_retryable() {
        let conflict = DeployError::from(StoreError::from_status(409, "a.yaml", "stale"));
        let client = DeployError::from(StoreError::transport("reset"));
        assert!(conflict.is_retryable());
        assert!(client.is_retryable());
        assert_eq!(conflict.kind(), DeployErrorKind::Conflict);
    }

    #[test]
    fn server_errors_are_fatal() {
        let err = DeployError::from(StoreError::from_status(503, "a.yaml", "unavailable"));
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), DeployErrorKind::Server);
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn exhausted_exposes_last_error() {
        let err = DeployError::AttemptsExhausted {
            attempts: 3,
            source: Box::new(StoreError::from_status(409, "a.yaml", "stale").into()),
        };
        assert_eq!(err.kind(), DeployErrorKind::AttemptsExhausted);
        assert_eq!(err.last_error().kind(), DeployErrorKind::Conflict);
        assert_eq!(err.status(), Some(409));
        assert!(err.to_string().starts_with("giving up after 3 attempt(s)"));
    }

    #[test]
    fn configuration_is_fatal() {
        let err = DeployError::configuration("manifest is missing 'images.property'");
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "configuration error: manifest is missing 'images.property'"
        );
    }
}
