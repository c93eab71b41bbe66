// ABOUTME: Advisory notifications emitted by the commit engine while it retries.
// ABOUTME: Observers never influence control flow; Diagnostics records and logs them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

/// Severity attached to a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected under concurrent writers (revision conflicts).
    Info,
    /// Unexpected failure that is still being retried.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single advisory notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub severity: Severity,
    /// Status indicator reported by the store (HTTP status), if any.
    pub status: Option<u16>,
    /// Attempt that just failed, counting from 1.
    pub attempt: u32,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(severity: Severity, attempt: u32, message: impl Into<String>) -> Self {
        Self {
            severity,
            status: None,
            attempt,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }
}

/// Receives notices from the commit engine.
pub trait CommitObserver: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<O: CommitObserver + ?Sized> CommitObserver for &O {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

/// Collects notices, auto-logging each one via tracing.
#[derive(Debug, Default)]
pub struct Diagnostics {
    notices: Mutex<Vec<Notice>>,
}

impl Diagnostics {
    /// Snapshot of all collected notices.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn has_errors(&self) -> bool {
        self.notices
            .lock()
            .iter()
            .any(|n| n.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl CommitObserver for Diagnostics {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(attempt = notice.attempt, "{}", notice.message),
            Severity::Error => tracing::warn!(attempt = notice.attempt, "{}", notice.message),
        }
        self.notices.lock().push(notice);
    }
}
