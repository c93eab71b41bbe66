// ABOUTME: Manifest model and deployment target resolution.
// ABOUTME: Derives which file and which key to write for a repository/branch pair.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::error::DeployError;

/// Well-known manifest location relative to the repository root.
pub const MANIFEST_PATH: &str = "kit.yaml";

/// Top-level configuration document describing where deployment files live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub images: Option<ImagesSection>,
}

/// The `images` section of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesSection {
    /// Base directory of the per-image files.
    #[serde(default)]
    pub path: Option<String>,
    /// Key to set inside each per-branch file.
    #[serde(default)]
    pub property: Option<String>,
}

impl Manifest {
    pub fn new(path: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            images: Some(ImagesSection {
                path: Some(path.into()),
                property: Some(property.into()),
            }),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    /// Read a manifest from a local file.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }

    fn images_path(&self) -> Option<&str> {
        self.images.as_ref().and_then(|i| i.path.as_deref())
    }

    fn images_property(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|i| i.property.as_deref())
            .filter(|p| !p.trim().is_empty())
    }
}

/// Where and under which key an image reference is written.
///
/// Resolved once per deployment and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    file_path: String,
    property: String,
    branch: String,
}

impl DeploymentTarget {
    /// Resolve the target for `repository` on `branch`.
    ///
    /// The file lives at `<images.path>/<repository>/<branch>.yaml`, with a
    /// single leading `/` on the base path ignored.
    pub fn resolve(
        manifest: &Manifest,
        repository: &str,
        branch: &str,
    ) -> Result<Self, DeployError> {
        let property = manifest
            .images_property()
            .ok_or_else(|| DeployError::configuration("manifest is missing 'images.property'"))?;
        let base = manifest
            .images_path()
            .ok_or_else(|| DeployError::configuration("manifest is missing 'images.path'"))?;

        let repository = repository.trim_matches('/');
        if repository.is_empty() {
            return Err(DeployError::configuration("image repository cannot be empty"));
        }
        if branch.trim().is_empty() {
            return Err(DeployError::configuration("branch cannot be empty"));
        }

        let file_name = format!("{branch}.yaml");
        let joined = [normalize_base(base), repository, file_name.as_str()].join("/");
        let file_path = collapse_segments(&joined).ok_or_else(|| {
            DeployError::configuration(format!(
                "deployment path '{joined}' escapes the repository root"
            ))
        })?;

        Ok(Self {
            file_path,
            property: property.to_string(),
            branch: branch.to_string(),
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.property, self.file_path)
    }
}

/// Strip a single leading path separator so the path is repository-relative.
pub fn normalize_base(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Join `path` segments the way a filesystem path join would: empty and `.`
/// segments are dropped and `..` removes the segment before it.
///
/// Returns `None` when a `..` would climb above the repository root.
fn collapse_segments(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}
