// ABOUTME: Optimistic-concurrency commit loop for a single mapping key.
// ABOUTME: Reads, decides, writes conditioned on the revision hash, and retries with linear backoff.

use serde_yaml::{Mapping, Value};
use std::time::Duration;

use crate::codec::DocumentCodec;
use crate::observer::{CommitObserver, Notice, Severity};
use crate::store::{CommitMeta, FileStore, RemoteFile, StoreError};
use crate::types::Committer;

use super::error::{DeployError, DeployErrorKind};
use super::outcome::{CommitOutcome, describe_commit};
use super::target::DeploymentTarget;

/// Default number of read-decide-write cycles.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Default backoff unit; the wait after the k-th failure is `k * base_delay`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(15);

/// Bounded linear backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is required.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Result<Self, DeployError> {
        if max_attempts == 0 {
            return Err(DeployError::configuration(
                "max_attempts must be at least 1",
            ));
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay before the next attempt once `failed_attempts` have failed.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        self.base_delay.saturating_mul(failed_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// Immutable inputs shared by every attempt of one invocation.
#[derive(Debug, Clone, Copy)]
pub struct AttemptContext<'a> {
    pub target: &'a DeploymentTarget,
    pub desired: &'a str,
    pub committer: Option<&'a Committer>,
    pub message: &'a str,
    pub dry_run: bool,
}

impl AttemptContext<'_> {
    fn meta(&self) -> CommitMeta<'_> {
        CommitMeta {
            message: self.message,
            committer: self.committer,
        }
    }

    fn description(&self) -> String {
        describe_commit(
            self.target.property(),
            self.desired,
            self.target.file_path(),
        )
    }
}

/// Progress of one invocation. Discarded when the engine returns.
#[derive(Debug, Default)]
pub struct CommitAttemptState {
    attempt_count: u32,
    last_error: Option<DeployError>,
}

impl CommitAttemptState {
    /// Number of the attempt in progress (or last finished), counting from 1.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn last_error(&self) -> Option<&DeployError> {
        self.last_error.as_ref()
    }

    fn begin_attempt(&mut self) -> u32 {
        self.attempt_count += 1;
        self.attempt_count
    }

    fn exhausted(self, error: DeployError) -> DeployError {
        DeployError::AttemptsExhausted {
            attempts: self.attempt_count,
            source: Box::new(error),
        }
    }
}

/// How a single attempt ended.
enum Step {
    Done(CommitOutcome),
    Retry(DeployError),
    Fatal(DeployError),
}

impl Step {
    /// Classify a store write failure: server errors are fatal, the rest retried.
    fn from_write_error(err: StoreError) -> Self {
        let err = DeployError::from(err);
        if err.kind() == DeployErrorKind::Server {
            Step::Fatal(err)
        } else {
            Step::Retry(err)
        }
    }
}

/// Drives the read-decide-write cycle until a terminal outcome.
pub struct CommitAttemptEngine<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    codec: &'a C,
    observer: &'a dyn CommitObserver,
    policy: RetryPolicy,
}

impl<'a, S, C> CommitAttemptEngine<'a, S, C>
where
    S: FileStore + ?Sized,
    C: DocumentCodec + ?Sized,
{
    pub fn new(
        store: &'a S,
        codec: &'a C,
        observer: &'a dyn CommitObserver,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            codec,
            observer,
            policy,
        }
    }

    /// Run attempts until the value is committed, found unchanged, previewed,
    /// or the invocation fails.
    ///
    /// Cancel-safe between attempts: dropping the future during a backoff or
    /// before a request abandons the run. A write already sent is not recalled.
    pub async fn run(&self, ctx: &AttemptContext<'_>) -> CommitOutcome {
        let mut state = CommitAttemptState::default();

        loop {
            let attempt = state.begin_attempt();

            let error = match self.attempt(ctx).await {
                Step::Done(outcome) => return outcome,
                Step::Fatal(error) => return CommitOutcome::Failed(error),
                Step::Retry(error) => error,
            };

            if attempt >= self.policy.max_attempts() {
                return CommitOutcome::Failed(state.exhausted(error));
            }

            let delay = self.policy.delay_after(attempt);
            state.last_error = Some(error);
            self.notify_retry(&state, ctx, delay);

            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, ctx: &AttemptContext<'_>) -> Step {
        match self.store.read(ctx.target.file_path()).await {
            Ok(file) => self.update_existing(ctx, file).await,
            Err(StoreError::NotFound { .. }) => self.create_missing(ctx).await,
            Err(err) => {
                let err = DeployError::from(err);
                if err.is_retryable() {
                    Step::Retry(err)
                } else {
                    Step::Fatal(err)
                }
            }
        }
    }

    async fn update_existing(&self, ctx: &AttemptContext<'_>, file: RemoteFile) -> Step {
        let path = ctx.target.file_path();
        let mut document = match self.codec.decode(&file.content) {
            Ok(document) => document,
            Err(source) => {
                return Step::Fatal(DeployError::UnsupportedDocument {
                    path: path.to_string(),
                    source,
                });
            }
        };

        let key = Value::from(ctx.target.property());
        let desired = Value::from(ctx.desired);
        if document.get(&key) == Some(&desired) {
            return Step::Done(CommitOutcome::NoChange);
        }

        document.insert(key, desired);
        let content = match self.encode(path, &document) {
            Ok(content) => content,
            Err(err) => return Step::Fatal(err),
        };

        if ctx.dry_run {
            return Step::Done(CommitOutcome::DryRunWouldCommit(ctx.description()));
        }

        match self
            .store
            .update(path, &content, &file.revision, ctx.meta())
            .await
        {
            Ok(_) => Step::Done(CommitOutcome::Committed(ctx.description())),
            Err(err) => Step::from_write_error(err),
        }
    }

    async fn create_missing(&self, ctx: &AttemptContext<'_>) -> Step {
        let path = ctx.target.file_path();
        let mut document = Mapping::new();
        document.insert(Value::from(ctx.target.property()), Value::from(ctx.desired));

        let content = match self.encode(path, &document) {
            Ok(content) => content,
            Err(err) => return Step::Fatal(err),
        };

        if ctx.dry_run {
            return Step::Done(CommitOutcome::DryRunWouldCommit(ctx.description()));
        }

        // Any create failure is retried, including a racing writer having
        // created the file: the next read takes the update path instead.
        match self.store.create(path, &content, ctx.meta()).await {
            Ok(_) => Step::Done(CommitOutcome::Committed(ctx.description())),
            Err(err) => Step::from_write_error(err),
        }
    }

    fn encode(&self, path: &str, document: &Mapping) -> Result<Vec<u8>, DeployError> {
        self.codec
            .encode(document)
            .map_err(|source| DeployError::UnsupportedDocument {
                path: path.to_string(),
                source,
            })
    }

    fn notify_retry(&self, state: &CommitAttemptState, ctx: &AttemptContext<'_>, delay: Duration) {
        let Some(error) = state.last_error() else {
            return;
        };

        let severity = if error.kind() == DeployErrorKind::Conflict {
            Severity::Info
        } else {
            Severity::Error
        };
        let status = error
            .status()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "no status".to_string());

        let message = format!(
            "attempt {}/{} on {} failed ({}): {}; retrying in {}",
            state.attempt_count(),
            self.policy.max_attempts(),
            ctx.target.file_path(),
            status,
            error,
            humantime::format_duration(delay)
        );

        self.observer.notify(
            Notice::new(severity, state.attempt_count(), message).with_status(error.status()),
        );
    }
}
