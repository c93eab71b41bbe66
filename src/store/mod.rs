// ABOUTME: Remote file store capability used by the commit engine.
// ABOUTME: Read, create, and hash-conditioned update of files in a hosted repository.

mod error;
mod github;

pub use error::StoreError;
pub use github::{DEFAULT_API_URL, GithubConfig, GithubStore};

use crate::types::{CommitSha, Committer, RevisionHash};
use async_trait::async_trait;

/// A file as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Decoded file bytes (transport encoding already removed).
    pub content: Vec<u8>,
    /// Hash identifying the exact version that was read.
    pub revision: RevisionHash,
}

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Revision hash of the file after the write.
    pub revision: RevisionHash,
    /// Commit that introduced the write, when the store reports one.
    pub commit: Option<CommitSha>,
}

/// Commit metadata shared by create and update.
#[derive(Debug, Clone, Copy)]
pub struct CommitMeta<'a> {
    pub message: &'a str,
    pub committer: Option<&'a Committer>,
}

/// Hosted repository file operations keyed by path and content hash.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Read a file and the revision hash it currently has.
    async fn read(&self, path: &str) -> Result<RemoteFile, StoreError>;

    /// Create a file that is believed not to exist yet.
    async fn create(
        &self,
        path: &str,
        content: &[u8],
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError>;

    /// Replace a file, provided it still has revision `expected`.
    ///
    /// Fails with [`StoreError::Conflict`] when another writer got there first.
    async fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &RevisionHash,
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError>;
}

#[async_trait]
impl<S: FileStore + ?Sized> FileStore for std::sync::Arc<S> {
    async fn read(&self, path: &str) -> Result<RemoteFile, StoreError> {
        (**self).read(path).await
    }

    async fn create(
        &self,
        path: &str,
        content: &[u8],
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        (**self).create(path, content, meta).await
    }

    async fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &RevisionHash,
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        (**self).update(path, content, expected, meta).await
    }
}
