// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Image references, repository slugs, committers, and typed Git ids.

mod committer;
mod id;
mod image_ref;
mod repo_slug;

pub use committer::Committer;
pub use id::{CommitSha, Id, RevisionHash};
pub use image_ref::{ImageReference, ParseImageReferenceError};
pub use repo_slug::{RepoSlug, RepoSlugError};
