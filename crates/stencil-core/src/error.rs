//! Unified error handling for stencil core.
//!
//! Wraps domain and application errors behind one type, with user-actionable
//! suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for stencil core operations.
///
/// Display is transparent so the CLI prints the underlying message as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StencilError {
    /// Errors from the domain layer (template and input logic).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and I/O).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StencilError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in stencil".into(),
                "Please report this issue at: https://github.com/cosecruz/stencil/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Template => ErrorCategory::Template,
                crate::domain::ErrorCategory::Conflict => ErrorCategory::Conflict,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Template,
    Conflict,
    NotFound,
    Configuration,
    Network,
    Io,
    Internal,
}

/// Convenient result type alias.
pub type StencilResult<T> = Result<T, StencilError>;
