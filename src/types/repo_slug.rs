// ABOUTME: GitHub repository identity in owner/name form.
// ABOUTME: Validates both halves against GitHub's allowed character set.

use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoSlugError {
    #[error("repository must be in owner/name form, got '{0}'")]
    MissingOwner(String),

    #[error("repository owner cannot be empty")]
    EmptyOwner,

    #[error("repository name cannot be empty")]
    EmptyName,

    #[error("invalid character in repository: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    owner: String,
    name: String,
}

impl RepoSlug {
    pub fn new(value: &str) -> Result<Self, RepoSlugError> {
        let value = value.trim();
        let (owner, name) = value
            .split_once('/')
            .ok_or_else(|| RepoSlugError::MissingOwner(value.to_string()))?;

        if owner.is_empty() {
            return Err(RepoSlugError::EmptyOwner);
        }
        if name.is_empty() {
            return Err(RepoSlugError::EmptyName);
        }

        for c in owner.chars().chain(name.chars()) {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(RepoSlugError::InvalidChar(c));
            }
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Build from already-validated parts.
    pub(crate) fn from_parts(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl<'de> Deserialize<'de> for RepoSlug {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RepoSlug::new(&s).map_err(serde::de::Error::custom)
    }
}
