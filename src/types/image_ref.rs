// ABOUTME: Deployable image reference parsing and construction.
// ABOUTME: Handles registry/repository:tag forms and commit-derived references.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageReferenceError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),

    #[error("{0} cannot be empty")]
    MissingPart(&'static str),
}

/// An immutable image reference such as `registry.example.com/svc:prod-abc123`.
///
/// Unlike a pull reference, no tag is implied: the value written to the
/// deployment file is exactly the one the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    registry: Option<String>,
    name: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    pub fn parse(input: &str) -> Result<Self, ParseImageReferenceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageReferenceError::Empty);
        }
        check_chars(input)?;

        let (without_digest, digest) = match input.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        let (without_tag, tag) = match without_digest.rsplit_once(':') {
            // A colon followed by a path is a registry port, not a tag
            Some((before, after)) if !after.contains('/') => (before, Some(after.to_string())),
            _ => (without_digest, None),
        };

        if tag.as_deref() == Some("") || digest.as_deref() == Some("") {
            return Err(ParseImageReferenceError::InvalidFormat(input.to_string()));
        }

        let (registry, name) = Self::parse_registry_and_name(without_tag)?;

        Ok(Self {
            registry,
            name,
            tag,
            digest,
        })
    }

    /// Build `registry/repository:branch-commit`, the naming scheme CI uses
    /// when pushing an image per commit.
    pub fn from_commit(
        registry: &str,
        repository: &str,
        branch: &str,
        commit_id: &str,
    ) -> Result<Self, ParseImageReferenceError> {
        let parts = [
            ("registry", registry),
            ("repository", repository),
            ("branch", branch),
            ("commit id", commit_id),
        ];
        for (label, part) in parts {
            if part.trim().is_empty() {
                return Err(ParseImageReferenceError::MissingPart(label));
            }
            check_chars(part)?;
        }

        Ok(Self {
            registry: Some(registry.trim_end_matches('/').to_string()),
            name: repository.to_string(),
            tag: Some(format!("{branch}-{commit_id}")),
            digest: None,
        })
    }

    fn parse_registry_and_name(
        input: &str,
    ) -> Result<(Option<String>, String), ParseImageReferenceError> {
        // A registry is present if the first component contains a dot or colon,
        // or is "localhost"
        match input.split_once('/') {
            None if input.is_empty() => {
                Err(ParseImageReferenceError::InvalidFormat(input.to_string()))
            }
            None => Ok((None, input.to_string())),
            Some((first, rest)) if first.is_empty() || rest.is_empty() => {
                Err(ParseImageReferenceError::InvalidFormat(input.to_string()))
            }
            Some((first, rest)) => {
                if first.contains('.') || first.contains(':') || first == "localhost" {
                    Ok((Some(first.to_string()), rest.to_string()))
                } else {
                    Ok((None, input.to_string()))
                }
            }
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

fn check_chars(input: &str) -> Result<(), ParseImageReferenceError> {
    match input
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@'))
    {
        Some(c) => Err(ParseImageReferenceError::InvalidChar(c)),
        None => Ok(()),
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ImageReference {
    type Err = ParseImageReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
