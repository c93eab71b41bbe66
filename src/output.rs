// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, and prints retry notices live.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::CommitOutcome;
use crate::observer::{CommitObserver, Notice, Severity};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_stderr("warning", message, None),
        }
    }

    /// Print the final outcome of a deployment.
    pub fn outcome(&self, outcome: &CommitOutcome) {
        match outcome {
            CommitOutcome::Failed(err) => self.error(&err.to_string()),
            _ => match self.mode {
                OutputMode::Normal => {
                    let elapsed = self.elapsed_secs();
                    if elapsed > 0.0 {
                        println!("{outcome} ({:.1}s)", elapsed);
                    } else {
                        println!("{outcome}");
                    }
                }
                OutputMode::Quiet => println!("{outcome}"),
                OutputMode::Json => {
                    let message = outcome.to_string();
                    self.emit_stdout(outcome.label(), &message);
                }
            },
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.emit_stderr("error", message, None),
        }
    }

    fn emit_stdout(&self, event: &str, message: &str) {
        let event = JsonEvent {
            event,
            message,
            status: None,
            duration_secs: self.duration(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            println!("{json}");
        }
    }

    fn emit_stderr(&self, event: &str, message: &str, status: Option<u16>) {
        let event = JsonEvent {
            event,
            message,
            status,
            duration_secs: self.duration(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            eprintln!("{json}");
        }
    }
}

impl CommitObserver for Output {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(attempt = notice.attempt, "{}", notice.message),
            Severity::Error => tracing::warn!(attempt = notice.attempt, "{}", notice.message),
        }

        match self.mode {
            OutputMode::Normal => println!("  ↻ {}", notice.message),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_stderr("retry", &notice.message, notice.status),
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
