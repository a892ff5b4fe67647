//! Template source descriptors.
//!
//! A descriptor is either a local path or a remote repository reference:
//!
//! ```text
//! ./templates/python             local path (file or directory)
//! gh://owner/repo                GitHub repository, default subpath
//! gh://owner/repo/sub/dir        GitHub repository, explicit subpath
//! ```
//!
//! The original string is kept verbatim so it can be persisted exactly as
//! the user typed it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::DomainError;

/// Directory used inside a remote repository when no subpath is given.
pub const DEFAULT_REMOTE_SUBPATH: &str = "stencil";

const GITHUB_SCHEME: &str = "gh://";

/// Where a template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    Local { path: PathBuf, raw: String },
    Remote(RemoteSource),
}

/// Supported remote hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteHost {
    GitHub,
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
        }
    }
}

/// A repository-hosted template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub host: RemoteHost,
    pub owner: String,
    pub repo: String,
    pub subpath: Option<String>,
    raw: String,
}

impl RemoteSource {
    /// Directory inside the repository that holds the template.
    pub fn template_path(&self) -> &str {
        self.subpath.as_deref().unwrap_or(DEFAULT_REMOTE_SUBPATH)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl SourceDescriptor {
    /// The descriptor exactly as it was given.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local { raw, .. } => raw,
            Self::Remote(remote) => &remote.raw,
        }
    }
}

impl FromStr for SourceDescriptor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidSource {
            source_str: s.to_string(),
            reason: reason.to_string(),
        };

        if s.trim().is_empty() {
            return Err(invalid("source is empty"));
        }

        if let Some(rest) = s.strip_prefix(GITHUB_SCHEME) {
            let mut parts = rest.split('/').filter(|p| !p.is_empty());
            let owner = parts
                .next()
                .ok_or_else(|| invalid("missing repository owner"))?;
            let repo = parts
                .next()
                .ok_or_else(|| invalid("missing repository name"))?;
            let subpath: Vec<&str> = parts.collect();

            if subpath.iter().any(|p| *p == "..") {
                return Err(invalid("subpath must not contain '..'"));
            }

            return Ok(Self::Remote(RemoteSource {
                host: RemoteHost::GitHub,
                owner: owner.to_string(),
                repo: repo.to_string(),
                subpath: (!subpath.is_empty()).then(|| subpath.join("/")),
                raw: s.to_string(),
            }));
        }

        // Anything else that looks like a URL scheme is unsupported.
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(invalid(&format!("unsupported scheme '{scheme}://'")));
        }

        Ok(Self::Local {
            path: PathBuf::from(s),
            raw: s.to_string(),
        })
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
