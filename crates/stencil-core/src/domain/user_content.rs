//! User-owned regions inside rendered files.
//!
//! A `.jinja` template reserves a region with
//! `{{ user_content("main", "#") }}`, which renders to:
//!
//! ```text
//! # begin-user-content:main
//! # user content here
//! # end-user-content:main
//! ```
//!
//! Whatever the project keeps between the two markers is carried into the
//! next rendering of the same file, so `apply` never overwrites it.
//!
//! ## Call forms
//!
//! | Call                                          | Markers                 |
//! |-----------------------------------------------|-------------------------|
//! | `user_content("k")`                           | `# begin-user-content:k` |
//! | `user_content("k", "//")`                     | `// begin-user-content:k` |
//! | `user_content("k", "<!--", "-->")`            | `<!-- begin-user-content:k -->` |
//! | `user_content("k", default="pass")`           | body `# pass`           |
//!
//! Arguments are positional (`key`, `begin_comment`, `end_comment`,
//! `default`) or named after the key. String literals use `"` or `'`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Body of a fresh block when the template gives no default.
pub const DEFAULT_BLOCK_TEXT: &str = "user content here";

const FUNCTION: &str = "user_content";
const BEGIN: &str = "begin-user-content:";
const END: &str = "end-user-content:";

static BEGIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<prefix>\S+) begin-user-content:(?P<key>\S+)")
        .expect("begin marker pattern is valid")
});

/// A parsed `user_content(...)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContent {
    pub key: String,
    pub begin_comment: String,
    pub end_comment: String,
    pub default: String,
}

impl UserContent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            begin_comment: "#".into(),
            end_comment: String::new(),
            default: String::new(),
        }
    }

    /// Parse the inside of a `{{ ... }}` placeholder.
    ///
    /// `None` when it is not a well-formed `user_content` call.
    pub fn parse(inner: &str) -> Option<Self> {
        let call = inner.trim().strip_prefix(FUNCTION)?.trim_start();
        let args = call.strip_prefix('(')?.strip_suffix(')')?;

        let mut positional = Vec::new();
        let mut named = Vec::new();
        for arg in split_args(args)? {
            match arg.split_once('=') {
                Some((name, value)) if is_name(name.trim()) => {
                    named.push((name.trim(), string_literal(value.trim())?));
                }
                _ => {
                    if !named.is_empty() {
                        return None;
                    }
                    positional.push(string_literal(arg.trim())?);
                }
            }
        }

        let mut positional = positional.into_iter();
        let key = positional.next()?;
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return None;
        }
        let mut block = Self::new(key);
        for (slot, value) in [
            &mut block.begin_comment,
            &mut block.end_comment,
            &mut block.default,
        ]
        .into_iter()
        .zip(positional.by_ref())
        {
            *slot = value;
        }
        if positional.next().is_some() {
            return None;
        }

        for (name, value) in named {
            match name {
                "begin_comment" => block.begin_comment = value,
                "end_comment" => block.end_comment = value,
                "default" => block.default = value,
                _ => return None,
            }
        }
        if block.begin_comment.trim().is_empty()
            || block.begin_comment.chars().any(char::is_whitespace)
        {
            return None;
        }
        Some(block)
    }

    /// Both markers around the default body.
    ///
    /// `indent` prefixes every line but the first, which sits wherever the
    /// placeholder was. No trailing newline.
    pub fn render(&self, indent: &str) -> String {
        let body = if self.default.is_empty() {
            DEFAULT_BLOCK_TEXT
        } else {
            self.default.as_str()
        };
        let end = if self.end_comment.is_empty() {
            String::new()
        } else {
            format!(" {}", self.end_comment)
        };
        let begin = &self.begin_comment;

        [
            format!("{begin} {BEGIN}{}{end}", self.key),
            format!("{begin} {body}{end}"),
            format!("{begin} {END}{}{end}", self.key),
        ]
        .join(&format!("\n{indent}"))
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split on commas outside quotes. `None` on an unterminated literal.
fn split_args(args: &str) -> Option<Vec<&str>> {
    if args.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut out = Vec::new();
    let mut quote = None;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                out.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return None;
    }
    out.push(&args[start..]);
    Some(out)
}

fn string_literal(s: &str) -> Option<String> {
    let quote = s.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let inner = s[1..].strip_suffix(quote)?;
    if inner.contains(quote) {
        return None;
    }
    Some(inner.to_string())
}

/// Collect every complete block in `text`, keyed by block key.
///
/// Each body line ends in `\n` and has the begin marker's indentation
/// removed. A begin marker without a matching end marker is ignored. When a
/// key appears twice the first block wins.
pub fn extract_blocks(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut blocks = BTreeMap::new();
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let mut i = 0;
    while i < lines.len() {
        let Some(begin) = BEGIN_LINE.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let indent = &begin["indent"];
        let end = format!("{} {END}{}", &begin["prefix"], &begin["key"]);

        let Some(offset) = lines[i + 1..].iter().position(|l| is_end(l, &end)) else {
            debug!(key = &begin["key"], "user content block has no end marker");
            i += 1;
            continue;
        };

        let body = lines[i + 1..i + 1 + offset]
            .iter()
            .map(|line| {
                let line = line.strip_suffix('\n').unwrap_or(line);
                let line = line.strip_prefix(indent).unwrap_or_else(|| line.trim_start());
                format!("{line}\n")
            })
            .collect();
        blocks.entry(begin["key"].to_string()).or_insert(body);
        i += offset + 2;
    }

    blocks
}

fn is_end(line: &str, marker: &str) -> bool {
    line.trim_start()
        .strip_prefix(marker)
        .is_some_and(|rest| rest.chars().next().is_none_or(char::is_whitespace))
}

/// Replace the bodies of blocks in `rendered` with the bodies the same keys
/// have in `current`.
///
/// `None` when nothing in `rendered` changes.
pub fn preserve(rendered: &str, current: &str) -> Option<String> {
    if !rendered.contains(BEGIN) || !current.contains(BEGIN) {
        return None;
    }
    let kept = extract_blocks(current);
    if kept.is_empty() {
        return None;
    }

    let lines: Vec<&str> = rendered.split_inclusive('\n').collect();
    let mut out = String::with_capacity(rendered.len());
    let mut i = 0;
    while i < lines.len() {
        out.push_str(lines[i]);
        let Some(begin) = BEGIN_LINE.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let Some(body) = kept.get(&begin["key"]) else {
            i += 1;
            continue;
        };
        let end = format!("{} {END}{}", &begin["prefix"], &begin["key"]);
        let Some(offset) = lines[i + 1..].iter().position(|l| is_end(l, &end)) else {
            i += 1;
            continue;
        };

        let indent = &begin["indent"];
        for line in body {
            if line.trim().is_empty() {
                out.push_str(line.trim_start_matches([' ', '\t']));
            } else {
                out.push_str(indent);
                out.push_str(line);
            }
        }
        i += offset + 1;
    }

    (out != rendered).then_some(out)
}
