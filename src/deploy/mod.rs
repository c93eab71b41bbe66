// ABOUTME: Deployment commit orchestration: target resolution, retry engine, outcomes.
// ABOUTME: Exports the coordinator entry point and the optimistic-concurrency engine.

mod coordinator;
mod engine;
mod error;
mod outcome;
mod target;

pub use coordinator::{DeployCoordinator, DeploySettings};
pub use engine::{
    AttemptContext, CommitAttemptEngine, CommitAttemptState, DEFAULT_BASE_DELAY,
    DEFAULT_MAX_ATTEMPTS, RetryPolicy,
};
pub use error::{DeployError, DeployErrorKind};
pub use outcome::{CommitOutcome, describe_commit};
pub use target::{DeploymentTarget, ImagesSection, MANIFEST_PATH, Manifest, normalize_base};
