// ============================================================================
// domain/error.rs - PURE LOGIC FAILURES
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (services pass them across rayon joins)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    #[error("Invalid source '{source_str}': {reason}")]
    InvalidSource { source_str: String, reason: String },

    #[error("Invalid override '{input}': {reason}")]
    InvalidOverride { input: String, reason: String },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid project config: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Binding Errors
    // ========================================================================
    #[error("Unknown argument '{key}'")]
    UnknownArgument { key: String, available: Vec<String> },

    #[error("Argument '{key}' has no value")]
    UnboundArgument {
        key: String,
        description: Option<String>,
    },

    // ========================================================================
    // Tree Errors
    // ========================================================================
    #[error("Template path '{template}' rendered to invalid name '{rendered}'")]
    InvalidRenderedPath { template: String, rendered: String },

    #[error("Duplicate path in rendered tree: {}", path.display())]
    DuplicatePath { path: PathBuf },

    #[error("Path conflict at {}: {reason}", path.display())]
    PathConflict { path: PathBuf, reason: String },

    #[error("Template renders reserved path '{}'", path.display())]
    ReservedPath { path: PathBuf },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidSource { .. } => vec![
                "Use a local path or gh://<owner>/<repo>[/<subpath>]".into(),
                "Example: stencil init ./my-app gh://acme/templates/python".into(),
            ],
            Self::InvalidOverride { .. } => vec![
                "Overrides use the form section.key=value".into(),
                "Valid keys: stencil.version, project.name, project.src, arguments.<key>".into(),
            ],
            Self::UnknownArgument { key, available } => {
                let mut out = vec![format!("The template does not declare '{}'", key)];
                if available.is_empty() {
                    out.push("This template takes no arguments".into());
                } else {
                    out.push("Declared arguments:".into());
                    for name in available {
                        out.push(format!("  • {}", name));
                    }
                }
                out
            }
            Self::InvalidConfig(_) => vec![
                "Check the .stencil.toml file at the project root".into(),
                "Re-create it with `stencil init` if it is corrupted".into(),
            ],
            Self::UnboundArgument { key, description } => {
                let mut out = Vec::new();
                if let Some(description) = description {
                    out.push(format!("'{}' is: {}", key, description));
                }
                out.push(format!("Pass a value with: -a {}=<value>", key));
                out.push("Or add a default to the template manifest".into());
                out
            }
            Self::PathConflict { path, .. } => vec![
                format!("Move or remove: {}", path.display()),
                "The template expects a different kind of entry at this path".into(),
            ],
            Self::ReservedPath { path } => vec![
                format!("'{}' holds the project config and cannot come from a template", path.display()),
                "Rename or remove that file in the template".into(),
            ],
            Self::InvalidRenderedPath { template, .. } => vec![
                format!("Check the argument values used by '{}'", template),
                "Rendered names must not be empty, '.', '..' or contain separators".into(),
            ],
            _ => vec!["Check the template for mistakes".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSource { .. }
            | Self::InvalidOverride { .. }
            | Self::UnknownArgument { .. }
            | Self::UnboundArgument { .. } => ErrorCategory::Validation,
            Self::InvalidManifest(_)
            | Self::InvalidRenderedPath { .. }
            | Self::DuplicatePath { .. }
            | Self::ReservedPath { .. } => ErrorCategory::Template,
            Self::InvalidConfig(_) => ErrorCategory::Configuration,
            Self::PathConflict { .. } => ErrorCategory::Conflict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Template,
    Conflict,
    Configuration,
}
