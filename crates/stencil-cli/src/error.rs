//! CLI error type and its rendering on stderr.
//!
//! Core failures pass through unchanged; the CLI only adds config and
//! terminal I/O failures of its own.

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use stencil_core::error::StencilError;

pub use stencil_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// An error propagated from `stencil-core` or its adapters.
    ///
    /// Displayed as-is so messages like `Destination 'x' already exists`
    /// reach the user unchanged.
    #[error(transparent)]
    Core(#[from] StencilError),

    // ── Config errors ──────────────────────────────────────────────────────
    /// The application config could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── System errors ──────────────────────────────────────────────────────
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core_err) => core_err.suggestions(),

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                format!(
                    "Check your config file at {}",
                    crate::config::AppConfig::config_path().display()
                ),
                "Environment overrides use the STENCIL_ prefix, e.g. STENCIL_REMOTE__MIRROR".into(),
            ],

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Check available disk space".into(),
            ],
        }
    }

    /// Get the error category for styling and logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Template | CoreCategory::Conflict => {
                    ErrorCategory::UserError
                }
                CoreCategory::NotFound | CoreCategory::Network => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Io | CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// Every handled failure exits with `1`; clap's own usage errors exit
    /// with `2` before a `CliError` can exist.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// `Error: <message>`, the cause chain when verbose, then suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        self.render(verbose, true)
    }

    /// Same layout as [`Self::format_colored`] without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        self.render(verbose, false)
    }

    fn render(&self, verbose: bool, color: bool) -> String {
        let mut out = if color {
            format!("{} {}\n", "Error:".red().bold(), self.to_string().red())
        } else {
            format!("Error: {self}\n")
        };

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let line = format!("Caused by: {err}");
                if color {
                    out.push_str(&format!("  {}\n", line.dimmed()));
                } else {
                    out.push_str(&format!("  {line}\n"));
                }
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            if color {
                out.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            } else {
                out.push_str("\nSuggestions:\n");
            }
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            let hint = "Use -v / --verbose for more details.";
            if color {
                out.push_str(&format!("\n{}\n", hint.dimmed()));
            } else {
                out.push_str(&format!("\n{hint}\n"));
            }
        }

        out
    }

    /// Record the error for `-vv` logs; `main` prints the user-facing report.
    pub fn log(&self) {
        let category = self.category();
        tracing::debug!(?category, "{self}");
        if let Some(source) = self.source() {
            tracing::debug!(%source, "caused by");
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments, conflicts).
    UserError,
    /// Resource not found or unreachable.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}
