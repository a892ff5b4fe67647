//! Template manifest: project name expression and declared arguments.

use std::collections::HashSet;

use super::DomainError;

/// File name of the manifest inside a template root.
pub const MANIFEST_FILE: &str = "stencil.toml";

/// Variable name reserved for the rendered project name.
pub const PROJECT_NAME_VAR: &str = "project_name";

/// One argument the template accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDecl {
    pub key: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

impl ArgumentDecl {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Parsed and validated manifest.
///
/// Argument order is declaration order; it drives suggestion output and the
/// order defaults are applied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    name: String,
    description: Option<String>,
    arguments: Vec<ArgumentDecl>,
}

impl Manifest {
    /// Build a manifest, rejecting empty names and bad argument keys.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        arguments: Vec<ArgumentDecl>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidManifest(
                "project name expression is empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for arg in &arguments {
            if !is_identifier(&arg.key) {
                return Err(DomainError::InvalidManifest(format!(
                    "argument key '{}' is not a valid identifier",
                    arg.key
                )));
            }
            if arg.key == PROJECT_NAME_VAR {
                return Err(DomainError::InvalidManifest(format!(
                    "argument key '{PROJECT_NAME_VAR}' is reserved"
                )));
            }
            if !seen.insert(arg.key.as_str()) {
                return Err(DomainError::InvalidManifest(format!(
                    "argument '{}' is declared more than once",
                    arg.key
                )));
            }
        }

        Ok(Self {
            name,
            description,
            arguments,
        })
    }

    /// The project name expression, rendered against the binding at `init`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arguments(&self) -> &[ArgumentDecl] {
        &self.arguments
    }

    pub fn declares(&self, key: &str) -> bool {
        self.arguments.iter().any(|a| a.key == key)
    }

    /// `key` or `key: description`, one per declared argument.
    pub fn argument_summaries(&self) -> Vec<String> {
        self.arguments
            .iter()
            .map(|a| match &a.description {
                Some(d) => format!("{}: {}", a.key, d),
                None => a.key.clone(),
            })
            .collect()
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
