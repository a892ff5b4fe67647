//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not template
//! logic. Logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// `init` never writes into an existing path.
    #[error("Destination '{}' already exists", path.display())]
    DestinationExists { path: PathBuf },

    /// Remote template could not be fetched.
    #[error("Source '{source_str}' is unreachable: {reason}")]
    SourceUnreachable { source_str: String, reason: String },

    /// No manifest where the source points.
    #[error("No template manifest found at {}", path.display())]
    ManifestMissing { path: PathBuf },

    /// `plan`/`apply` on a directory that was never initialised.
    #[error("No stencil config found at {}", path.display())]
    ConfigMissing { path: PathBuf },

    /// Filesystem operation failed.
    #[error("Filesystem error at {}: {reason}", path.display())]
    FilesystemError { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DestinationExists { path } => vec![
                format!("Choose a path that does not exist yet, not {}", path.display()),
                "To update an existing project use: stencil plan / stencil apply".into(),
            ],
            Self::SourceUnreachable { .. } => vec![
                "Check the owner, repository and subpath".into(),
                "Set GITHUB_TOKEN for private repositories or rate limits".into(),
                "Or point remote.mirror at a local checkout".into(),
            ],
            Self::ManifestMissing { path } => vec![
                format!("Expected a stencil.toml at {}", path.display()),
                "Pass the template directory or its stencil.toml directly".into(),
            ],
            Self::ConfigMissing { path } => vec![
                format!("{} has not been initialised", path.display()),
                "Create the project first with: stencil init <dest> <source>".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DestinationExists { .. } => ErrorCategory::Conflict,
            Self::SourceUnreachable { .. } => ErrorCategory::Network,
            Self::ManifestMissing { .. } | Self::ConfigMissing { .. } => ErrorCategory::NotFound,
            Self::FilesystemError { .. } => ErrorCategory::Io,
        }
    }
}
