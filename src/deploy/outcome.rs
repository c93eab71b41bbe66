// ABOUTME: The single observable result of a deployment commit.
// ABOUTME: No change, dry-run preview, committed, or failed with a terminal error.

use std::fmt;

use super::error::DeployError;

/// Result of one deployment invocation. Exactly one is produced per call.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The stored value already equals the desired one.
    NoChange,
    /// Dry run: a commit would have been made.
    DryRunWouldCommit(String),
    /// The store accepted the write.
    Committed(String),
    /// The invocation ended with a fatal or exhausting error.
    Failed(DeployError),
}

impl CommitOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CommitOutcome::Failed(_))
    }

    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            CommitOutcome::NoChange => "no_change",
            CommitOutcome::DryRunWouldCommit(_) => "dry_run",
            CommitOutcome::Committed(_) => "committed",
            CommitOutcome::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&DeployError> {
        match self {
            CommitOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Convert into a `Result`, keeping successful outcomes as `Ok`.
    pub fn into_result(self) -> Result<CommitOutcome, DeployError> {
        match self {
            CommitOutcome::Failed(err) => Err(err),
            other => Ok(other),
        }
    }
}

impl fmt::Display for CommitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitOutcome::NoChange => write!(f, "No changes found"),
            CommitOutcome::DryRunWouldCommit(message) => {
                write!(f, "Commit disabled, but would have {message}")
            }
            CommitOutcome::Committed(message) => write!(f, "Successfully {message}"),
            CommitOutcome::Failed(err) => write!(f, "Failed: {err}"),
        }
    }
}

/// Human-facing description of a commit, e.g.
/// `committed image: 'reg/svc:prod-def456' to deploy/svc/prod.yaml`.
pub fn describe_commit(property: &str, value: &str, file_path: &str) -> String {
    format!("committed {property}: '{value}' to {file_path}")
}
