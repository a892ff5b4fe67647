//! Argument binding: merging defaults, persisted values and CLI input.
//!
//! ## Precedence (lowest to highest)
//!
//! | Layer            | Origin                          |
//! |------------------|---------------------------------|
//! | defaults         | `[[arguments]] default = ...`   |
//! | persisted        | `.stencil.toml [arguments]`     |
//! | cli              | `-a key=value` on `init`        |
//! | overrides        | `--override arguments.key=...`  |
//!
//! The resulting [`ArgumentBinding`] is never mutated after construction.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{DomainError, Manifest};

/// How a bound value is written into a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionMode {
    /// The value exactly as supplied.
    #[default]
    Raw,
    /// Unquoted integer, or a double-quoted string.
    Literal,
}

impl SubstitutionMode {
    /// Parse a placeholder filter name (`raw`, `literal`).
    pub fn from_filter(name: &str) -> Option<Self> {
        match name {
            "raw" => Some(Self::Raw),
            "literal" => Some(Self::Literal),
            _ => None,
        }
    }
}

/// A single bound argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BoundValue {
    raw: String,
}

impl BoundValue {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `0` → `0`, `-12` → `-12`, `one` → `"one"`.
    pub fn literal(&self) -> String {
        if is_integer(&self.raw) {
            return self.raw.clone();
        }
        let mut out = String::with_capacity(self.raw.len() + 2);
        out.push('"');
        for c in self.raw.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                other => out.push(other),
            }
        }
        out.push('"');
        out
    }

    pub fn render(&self, mode: SubstitutionMode) -> String {
        match mode {
            SubstitutionMode::Raw => self.raw.clone(),
            SubstitutionMode::Literal => self.literal(),
        }
    }
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Final key → value mapping for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgumentBinding {
    values: BTreeMap<String, BoundValue>,
}

impl ArgumentBinding {
    pub fn get(&self, key: &str) -> Option<&BoundValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values, as persisted to the config store.
    pub fn to_raw_map(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.raw.clone()))
            .collect()
    }
}

/// Merge all layers into a binding.
///
/// CLI and override keys must be declared by the manifest. Persisted keys
/// the manifest no longer declares are dropped with a warning.
pub fn bind(
    manifest: &Manifest,
    persisted: &BTreeMap<String, String>,
    cli_args: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Result<ArgumentBinding, DomainError> {
    for key in cli_args.keys().chain(overrides.keys()) {
        if !manifest.declares(key) {
            return Err(DomainError::UnknownArgument {
                key: key.clone(),
                available: manifest.argument_summaries(),
            });
        }
    }

    for key in persisted.keys().filter(|k| !manifest.declares(k)) {
        warn!(key = %key, "persisted argument is no longer declared by the template");
    }

    let mut values = BTreeMap::new();
    for decl in manifest.arguments() {
        let key = decl.key.as_str();
        let value = overrides
            .get(key)
            .or_else(|| cli_args.get(key))
            .or_else(|| persisted.get(key))
            .or(decl.default.as_ref())
            .ok_or_else(|| DomainError::UnboundArgument {
                key: key.to_string(),
                description: decl.description.clone(),
            })?;
        values.insert(key.to_string(), BoundValue::new(value.clone()));
    }

    debug!(count = values.len(), "arguments bound");
    Ok(ArgumentBinding { values })
}
