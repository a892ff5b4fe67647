//! Schema of the per-project `.stencil.toml`.
//!
//! ```toml
//! [stencil]
//! version = "1"
//!
//! [project]
//! name = "my_project"
//! src = "gh://acme/templates/python"
//!
//! [arguments]
//! arg0 = "0"
//! ```
//!
//! Written only by `init`. `plan` and `apply` layer one-shot overrides on
//! top of a copy; the persisted values never change.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DomainError, SourceDescriptor, manifest::is_identifier};

/// File name of the config store, at the destination root.
pub const CONFIG_FILE: &str = ".stencil.toml";

/// The only schema version this build reads and writes.
pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub stencil: StencilSection,
    pub project: ProjectSection,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StencilSection {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    pub src: String,
}

impl ProjectConfig {
    pub fn new(
        name: impl Into<String>,
        src: impl Into<String>,
        arguments: BTreeMap<String, String>,
    ) -> Self {
        Self {
            stencil: StencilSection {
                version: SCHEMA_VERSION.to_string(),
            },
            project: ProjectSection {
                name: name.into(),
                src: src.into(),
            },
            arguments,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.stencil.version != SCHEMA_VERSION {
            return Err(DomainError::InvalidConfig(format!(
                "unsupported schema version '{}' (expected '{SCHEMA_VERSION}')",
                self.stencil.version
            )));
        }
        if self.project.name.trim().is_empty() {
            return Err(DomainError::InvalidConfig("project.name is empty".into()));
        }
        if self.project.src.trim().is_empty() {
            return Err(DomainError::InvalidConfig("project.src is empty".into()));
        }
        Ok(())
    }

    pub fn source(&self) -> Result<SourceDescriptor, DomainError> {
        self.project.src.parse()
    }

    /// A copy with `stencil.*` and `project.*` overrides applied.
    ///
    /// Argument overrides are not folded in here; they go to the binder as
    /// their own layer (see [`argument_overrides`]).
    pub fn with_overrides(&self, overrides: &[ConfigOverride]) -> Result<Self, DomainError> {
        let mut effective = self.clone();
        for o in overrides {
            match o {
                ConfigOverride::StencilVersion(v) => effective.stencil.version = v.clone(),
                ConfigOverride::ProjectName(v) => effective.project.name = v.clone(),
                ConfigOverride::ProjectSrc(v) => effective.project.src = v.clone(),
                ConfigOverride::Argument { .. } => {}
            }
        }
        effective.validate()?;
        Ok(effective)
    }
}

/// One `section.key=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverride {
    StencilVersion(String),
    ProjectName(String),
    ProjectSrc(String),
    Argument { key: String, value: String },
}

impl FromStr for ConfigOverride {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidOverride {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| invalid("expected section.key=value"))?;
        let (section, name) = key
            .trim()
            .split_once('.')
            .ok_or_else(|| invalid("key must be qualified with a section"))?;
        let value = value.to_string();

        match (section, name) {
            ("stencil", "version") => Ok(Self::StencilVersion(value)),
            ("project", "name") => Ok(Self::ProjectName(value)),
            ("project", "src") => Ok(Self::ProjectSrc(value)),
            ("arguments", key) if is_identifier(key) => Ok(Self::Argument {
                key: key.to_string(),
                value,
            }),
            ("arguments", _) => Err(invalid("argument key is not a valid identifier")),
            _ => Err(invalid(&format!("unknown key '{key}'"))),
        }
    }
}

/// Collect the `arguments.*` overrides; later ones win.
pub fn argument_overrides(overrides: &[ConfigOverride]) -> BTreeMap<String, String> {
    overrides
        .iter()
        .filter_map(|o| match o {
            ConfigOverride::Argument { key, value } => Some((key.clone(), value.clone())),
            _ => None,
        })
        .collect()
}
