// ABOUTME: Entry point that resolves the manifest and target, then runs the commit engine.
// ABOUTME: Exposes deploy-by-image and deploy-by-commit-id operations returning one outcome.

use snafu::ResultExt;

use crate::codec::{DocumentCodec, YamlCodec};
use crate::observer::{CommitObserver, Diagnostics};
use crate::store::FileStore;
use crate::types::{Committer, ImageReference};

use super::engine::{AttemptContext, CommitAttemptEngine, RetryPolicy};
use super::error::{DeployError, ManifestInvalidSnafu, ManifestUnavailableSnafu};
use super::outcome::CommitOutcome;
use super::target::{DeploymentTarget, MANIFEST_PATH, Manifest};

/// Read-only settings shared by every deployment a coordinator runs.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// Registry host used to build commit-derived image references.
    pub registry: String,
    /// Image repository name; also a path segment of the target file.
    pub repository: String,
    /// Location of the manifest in the store.
    pub manifest_path: String,
    /// Pre-supplied manifest. When set, the store copy is never fetched.
    pub manifest: Option<Manifest>,
    pub retry: RetryPolicy,
}

impl DeploySettings {
    pub fn new(registry: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            repository: repository.into(),
            manifest_path: MANIFEST_PATH.to_string(),
            manifest: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn manifest_path(mut self, path: impl Into<String>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }
}

/// Resolves where to write and drives one commit engine run per call.
pub struct DeployCoordinator<S, C = YamlCodec, O = Diagnostics> {
    store: S,
    codec: C,
    observer: O,
    settings: DeploySettings,
}

impl<S: FileStore> DeployCoordinator<S> {
    pub fn new(store: S, settings: DeploySettings) -> Self {
        Self {
            store,
            codec: YamlCodec,
            observer: Diagnostics::default(),
            settings,
        }
    }
}

impl<S, C, O> DeployCoordinator<S, C, O> {
    pub fn with_codec<C2>(self, codec: C2) -> DeployCoordinator<S, C2, O> {
        DeployCoordinator {
            store: self.store,
            codec,
            observer: self.observer,
            settings: self.settings,
        }
    }

    pub fn with_observer<O2>(self, observer: O2) -> DeployCoordinator<S, C, O2> {
        DeployCoordinator {
            store: self.store,
            codec: self.codec,
            observer,
            settings: self.settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }
}

impl<S, C, O> DeployCoordinator<S, C, O>
where
    S: FileStore,
    C: DocumentCodec,
    O: CommitObserver,
{
    /// Use the pre-supplied manifest, or fetch and decode the store copy.
    ///
    /// Fetch failures are not retried.
    pub async fn resolve_manifest(&self) -> Result<Manifest, DeployError> {
        if let Some(manifest) = &self.settings.manifest {
            return Ok(manifest.clone());
        }

        let path = self.settings.manifest_path.as_str();
        tracing::debug!("Fetching manifest {}", path);

        let file = self
            .store
            .read(path)
            .await
            .context(ManifestUnavailableSnafu { path })?;

        Manifest::from_slice(&file.content).context(ManifestInvalidSnafu { path })
    }

    /// Resolve the file and key a deployment on `branch` would write.
    pub async fn resolve_target(&self, branch: &str) -> Result<DeploymentTarget, DeployError> {
        let manifest = self.resolve_manifest().await?;
        let target = DeploymentTarget::resolve(&manifest, &self.settings.repository, branch)?;
        tracing::debug!(
            "Resolved target {} (property {})",
            target.file_path(),
            target.property()
        );
        Ok(target)
    }

    /// Write `image` into the deployment file for `branch`.
    pub async fn deploy_image(
        &self,
        image: &ImageReference,
        branch: &str,
        committer: Option<&Committer>,
        message: &str,
        dry_run: bool,
    ) -> CommitOutcome {
        let target = match self.resolve_target(branch).await {
            Ok(target) => target,
            Err(err) => return CommitOutcome::Failed(err),
        };

        let desired = image.to_string();
        let ctx = AttemptContext {
            target: &target,
            desired: &desired,
            committer,
            message,
            dry_run,
        };

        let engine = CommitAttemptEngine::new(
            &self.store,
            &self.codec,
            &self.observer,
            self.settings.retry,
        );
        let outcome = engine.run(&ctx).await;

        if let CommitOutcome::Committed(description) = &outcome {
            tracing::info!("{}", description);
        }
        outcome
    }

    /// Deploy `registry/repository:branch-commit_id`.
    pub async fn deploy_commit_id(
        &self,
        commit_id: &str,
        branch: &str,
        committer: Option<&Committer>,
        message: &str,
        dry_run: bool,
    ) -> CommitOutcome {
        match self.image_for_commit(commit_id, branch) {
            Ok(image) => {
                self.deploy_image(&image, branch, committer, message, dry_run)
                    .await
            }
            Err(err) => CommitOutcome::Failed(err),
        }
    }

    /// The image reference `deploy_commit_id` would write.
    pub fn image_for_commit(
        &self,
        commit_id: &str,
        branch: &str,
    ) -> Result<ImageReference, DeployError> {
        ImageReference::from_commit(
            &self.settings.registry,
            &self.settings.repository,
            branch,
            commit_id,
        )
        .map_err(|e| DeployError::configuration(format!("invalid image reference: {e}")))
    }
}
