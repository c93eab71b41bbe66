// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted in-memory FileStore and a tracing init helper.

#![allow(dead_code)]

use async_trait::async_trait;
use kit_deployer::store::{CommitMeta, FileStore, RemoteFile, StoreError, WriteReceipt};
use kit_deployer::types::{CommitSha, Committer, RevisionHash};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("kit_deployer=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A store operation as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read(String),
    Create {
        path: String,
        content: String,
    },
    Update {
        path: String,
        content: String,
        expected: String,
    },
}

/// What a scripted hook does right before an operation runs.
#[derive(Debug, Clone)]
pub enum Injection {
    /// Fail the operation with this error.
    Fail(StoreError),
    /// Another writer replaces the file contents first.
    ForeignWrite { path: String, content: String },
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: Vec<u8>,
    revision: u64,
}

#[derive(Default)]
struct Inner {
    files: HashMap<String, StoredFile>,
    next_revision: u64,
    calls: Vec<Call>,
    committers: Vec<Option<Committer>>,
    messages: Vec<String>,
    on_read: VecDeque<Injection>,
    on_create: VecDeque<Injection>,
    on_update: VecDeque<Injection>,
}

impl Inner {
    fn put(&mut self, path: &str, content: &[u8]) -> u64 {
        self.next_revision += 1;
        self.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_vec(),
                revision: self.next_revision,
            },
        );
        self.next_revision
    }

    /// Apply the next scripted injection; returns an error to fail with.
    fn inject(&mut self, injection: Option<Injection>) -> Option<StoreError> {
        match injection? {
            Injection::Fail(err) => Some(err),
            Injection::ForeignWrite { path, content } => {
                self.put(&path, content.as_bytes());
                None
            }
        }
    }
}

fn revision_hash(revision: u64) -> RevisionHash {
    RevisionHash::new(format!("rev{revision:04}"))
}

/// In-memory `FileStore` enforcing revision checks like a hosted repository.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    yield_on_read: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.inner.lock().put(path, content.as_bytes());
        self
    }

    /// Yield to the scheduler after every read so concurrent callers interleave.
    pub fn yielding(mut self) -> Self {
        self.yield_on_read = true;
        self
    }

    pub fn with_manifest(self, images_path: &str, property: &str) -> Self {
        self.with_file(
            "kit.yaml",
            &format!("images:\n  path: {images_path}\n  property: {property}\n"),
        )
    }

    pub fn on_read(&self, injection: Injection) {
        self.inner.lock().on_read.push_back(injection);
    }

    pub fn on_create(&self, injection: Injection) {
        self.inner.lock().on_create.push_back(injection);
    }

    pub fn on_update(&self, injection: Injection) {
        self.inner.lock().on_update.push_back(injection);
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.inner
            .lock()
            .files
            .get(path)
            .map(|f| String::from_utf8_lossy(&f.content).into_owned())
    }

    pub fn revision(&self, path: &str) -> Option<RevisionHash> {
        self.inner
            .lock()
            .files
            .get(path)
            .map(|f| revision_hash(f.revision))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.inner.lock().messages.clone()
    }

    pub fn committers(&self) -> Vec<Option<Committer>> {
        self.inner.lock().committers.clone()
    }

    pub fn reads(&self, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Read(p) if p == path))
            .count()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn updates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .count()
    }

    pub fn writes(&self) -> usize {
        self.creates() + self.updates()
    }
}

impl MemoryStore {
    fn read_now(&self, path: &str) -> Result<RemoteFile, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Read(path.to_string()));

        let injection = inner.on_read.pop_front();
        if let Some(err) = inner.inject(injection) {
            return Err(err);
        }

        inner
            .files
            .get(path)
            .map(|f| RemoteFile {
                content: f.content.clone(),
                revision: revision_hash(f.revision),
            })
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<RemoteFile, StoreError> {
        let result = self.read_now(path);
        if self.yield_on_read {
            tokio::task::yield_now().await;
        }
        result
    }

    async fn create(
        &self,
        path: &str,
        content: &[u8],
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Create {
            path: path.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
        });

        let injection = inner.on_create.pop_front();
        if let Some(err) = inner.inject(injection) {
            return Err(err);
        }

        if inner.files.contains_key(path) {
            return Err(StoreError::Client {
                status: Some(422),
                message: "Invalid request. \"sha\" wasn't supplied.".to_string(),
            });
        }

        inner.committers.push(meta.committer.cloned());
        inner.messages.push(meta.message.to_string());
        let revision = inner.put(path, content);
        Ok(WriteReceipt {
            revision: revision_hash(revision),
            commit: Some(CommitSha::new(format!("commit{revision:04}"))),
        })
    }

    async fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &RevisionHash,
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Update {
            path: path.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
            expected: expected.to_string(),
        });

        let injection = inner.on_update.pop_front();
        if let Some(err) = inner.inject(injection) {
            return Err(err);
        }

        let current = match inner.files.get(path) {
            Some(file) => revision_hash(file.revision),
            None => {
                return Err(StoreError::NotFound {
                    path: path.to_string(),
                });
            }
        };
        if &current != expected {
            return Err(StoreError::Conflict {
                path: path.to_string(),
                message: format!("{path} is at {current} but expected {expected}"),
            });
        }

        inner.committers.push(meta.committer.cloned());
        inner.messages.push(meta.message.to_string());
        let revision = inner.put(path, content);
        Ok(WriteReceipt {
            revision: revision_hash(revision),
            commit: Some(CommitSha::new(format!("commit{revision:04}"))),
        })
    }
}
