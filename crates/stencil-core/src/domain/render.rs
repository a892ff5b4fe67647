//! Variable substitution for template names and contents.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{ArgumentBinding, BoundValue, PROJECT_NAME_VAR, SubstitutionMode, UserContent};

/// Context for template rendering.
///
/// A **Value Object** holding every variable a template may reference: the
/// bound arguments plus `project_name` once it is known. Immutable after
/// creation; `with_project_name` returns a new context.
///
/// ## Placeholder grammar
///
/// | Placeholder              | Output                         |
/// |--------------------------|--------------------------------|
/// | `{{ key }}`              | raw value                      |
/// | `{{ key \| raw }}`       | raw value                      |
/// | `{{ key \| literal }}`   | `0` or `"text"`                |
/// | `{{ user_content("k") }}` | user content block (see [`UserContent`]) |
///
/// Whitespace inside the braces is optional. A block placed after nothing
/// but indentation repeats that indentation on each of its lines.
///
/// ## Edge Cases
///
/// - `{{ unknown }}` → left verbatim
/// - `{{ key | upper }}` → left verbatim (unsupported filter)
/// - `{{` without a closing `}}` → left verbatim
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    variables: BTreeMap<String, BoundValue>,
}

impl RenderContext {
    pub fn new(binding: &ArgumentBinding) -> Self {
        let variables = binding
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Self { variables }
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.variables
            .insert(PROJECT_NAME_VAR.to_string(), BoundValue::new(name));
        self
    }

    pub fn get(&self, key: &str) -> Option<&BoundValue> {
        self.variables.get(key)
    }

    /// Render a template string by replacing placeholders.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            let Some(end) = after_open.find("}}") else {
                // Unterminated: copy the remainder untouched.
                out.push_str(&rest[start..]);
                return out;
            };

            let inner = &after_open[..end];
            match self.substitute(inner) {
                Some(value) => out.push_str(&value),
                None if inner.trim_start().starts_with("user_content") => {
                    match UserContent::parse(inner) {
                        Some(block) => {
                            let indent = line_indent(&out).to_string();
                            out.push_str(&block.render(&indent));
                        }
                        None => {
                            warn!(placeholder = inner.trim(), "malformed user_content call");
                            out.push_str(&rest[start..start + 2 + end + 2]);
                        }
                    }
                }
                None => {
                    debug!(placeholder = inner.trim(), "leaving placeholder untouched");
                    out.push_str(&rest[start..start + 2 + end + 2]);
                }
            }
            rest = &after_open[end + 2..];
        }

        out.push_str(rest);
        out
    }

    fn substitute(&self, inner: &str) -> Option<String> {
        let (key, mode) = match inner.split_once('|') {
            Some((key, filter)) => (key.trim(), SubstitutionMode::from_filter(filter.trim())?),
            None => (inner.trim(), SubstitutionMode::Raw),
        };
        self.variables.get(key).map(|v| v.render(mode))
    }
}

/// Leading whitespace of the last line of `out`, if that is all it holds.
fn line_indent(out: &str) -> &str {
    let line = out.rsplit('\n').next().unwrap_or_default();
    if line.chars().all(|c| c == ' ' || c == '\t') {
        line
    } else {
        ""
    }
}
