// ABOUTME: Container image reference parsing and construction.
// ABOUTME: Handles formats like repo:tag, registry/repo:tag and registry:port/repo@digest.

use std::fmt;
use thiserror::Error;

use super::ImageTag;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),
}

/// A registry-qualified image reference.
///
/// References built by the coordinator always carry a registry host and a tag.
/// References read back from the cluster may carry neither, or a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    /// Build `registry/repository:tag`.
    pub fn new(registry: &str, repository: &str, tag: &ImageTag) -> Result<Self, ParseImageRefError> {
        let registry = registry.trim().trim_end_matches('/');
        let repository = repository.trim().trim_matches('/');
        if registry.is_empty() {
            return Err(ParseImageRefError::InvalidFormat(
                "registry host cannot be empty".to_string(),
            ));
        }
        if repository.is_empty() {
            return Err(ParseImageRefError::InvalidFormat(
                "repository cannot be empty".to_string(),
            ));
        }
        for c in registry.chars().chain(repository.chars()) {
            check_char(c)?;
        }
        if registry.contains('@') || repository.contains(':') || repository.contains('@') {
            return Err(ParseImageRefError::InvalidFormat(format!(
                "{registry}/{repository}"
            )));
        }

        Ok(Self {
            registry: Some(registry.to_string()),
            repository: repository.to_string(),
            tag: Some(tag.as_str().to_string()),
            digest: None,
        })
    }

    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in input.chars() {
            check_char(c)?;
        }

        // Split off digest if present
        let (without_digest, digest) = match input.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        // A colon followed by a slash belongs to a registry port, not a tag
        let (without_tag, tag) = match without_digest.rsplit_once(':') {
            Some((before, after)) if !after.contains('/') => (before, Some(after.to_string())),
            _ => (without_digest, None),
        };

        let (registry, repository) = Self::parse_registry_and_repository(without_tag)?;

        if repository.is_empty() || tag.as_deref() == Some("") {
            return Err(ParseImageRefError::InvalidFormat(input.to_string()));
        }

        // Default tag to "latest" if no tag and no digest
        let tag = match (&tag, &digest) {
            (None, None) => Some("latest".to_string()),
            _ => tag,
        };

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }

    fn parse_registry_and_repository(
        input: &str,
    ) -> Result<(Option<String>, String), ParseImageRefError> {
        // The first component is a registry if it looks like a host
        match input.split_once('/') {
            None => Ok((None, input.to_string())),
            Some((first, rest)) => {
                if rest.is_empty() {
                    return Err(ParseImageRefError::InvalidFormat(input.to_string()));
                }
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

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

fn check_char(c: char) -> Result<(), ParseImageRefError> {
    if c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '-' | '_' | '@') {
        Ok(())
    } else {
        Err(ParseImageRefError::InvalidChar(c))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.repository)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}
