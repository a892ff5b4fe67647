//! Drift detection: rendered tree vs. destination snapshot.
//!
//! ## Classification (per rendered path)
//!
//! | Destination       | Rendered      | Kind            |
//! |-------------------|---------------|-----------------|
//! | absent            | directory     | `NewDirectory`  |
//! | absent            | empty file    | `NewEmptyFile`  |
//! | absent            | file          | `NewFile`       |
//! | file, different   | file          | `ModifiedFile`  |
//! | same              | same          | `Unchanged`     |
//! | directory         | file          | `PathConflict`  |
//! | file              | directory     | `PathConflict`  |
//!
//! Paths that only exist in the destination are never reported.
//!
//! ## Text form
//!
//! ```text
//! --- old/tests    (directory not found)
//! +++ new/tests    (new directory)
//!
//! --- old/README.md
//! +++ new/README.md
//! -   4 B
//! +   4 X
//! ```
//!
//! A non-UTF-8 side prints `Binary files differ` instead of lines; a last
//! line without a newline is followed by `\ No newline at end of file`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use super::{DestinationEntry, DestinationTree, DomainError, RenderedEntry, RenderedTree};

/// Separator between a header path and its annotation.
const ANNOTATION_GAP: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    entries: Vec<PlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: PlanKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanKind {
    NewDirectory,
    NewEmptyFile,
    NewFile {
        #[serde(skip)]
        contents: Vec<u8>,
    },
    ModifiedFile {
        #[serde(skip)]
        contents: Vec<u8>,
        diff: LineDiff,
    },
    Unchanged,
}

impl PlanKind {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Changed lines only: no hunk headers, no context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
    /// Either side is not text; `lines` is empty.
    #[serde(skip_serializing_if = "is_false")]
    pub binary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub change: LineChange,
    /// 1-based; old numbering for removals, new numbering for additions.
    pub number: usize,
    pub text: String,
    /// Last line of its side, with no trailing newline.
    #[serde(skip_serializing_if = "is_false")]
    pub missing_newline: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

const BINARY_NOTE: &str = "Binary files differ";
const NO_NEWLINE_NOTE: &str = "\\ No newline at end of file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineChange {
    Removed,
    Added,
}

impl LineDiff {
    pub fn between(old: &[u8], new: &[u8]) -> Self {
        let (Some(old), Some(new)) = (as_text(old), as_text(new)) else {
            return Self {
                lines: Vec::new(),
                binary: true,
            };
        };
        let diff = TextDiff::from_lines(old, new);

        let lines = diff
            .iter_all_changes()
            .filter_map(|change| {
                let (kind, index) = match change.tag() {
                    ChangeTag::Delete => (LineChange::Removed, change.old_index()?),
                    ChangeTag::Insert => (LineChange::Added, change.new_index()?),
                    ChangeTag::Equal => return None,
                };
                Some(DiffLine {
                    change: kind,
                    number: index + 1,
                    text: strip_newline(change.value()).to_string(),
                    missing_newline: change.missing_newline(),
                })
            })
            .collect();

        Self {
            lines,
            binary: false,
        }
    }
}

/// UTF-8 without NUL bytes counts as text.
fn as_text(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes).ok().filter(|s| !s.contains('\0'))
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

impl Plan {
    /// Compare every rendered path against the destination snapshot.
    pub fn diff(rendered: &RenderedTree, destination: &DestinationTree) -> Result<Self, DomainError> {
        let mut entries = Vec::with_capacity(rendered.len());

        for (path, entry) in rendered.iter() {
            let kind = classify(path, entry, destination.get(path))?;
            entries.push(PlanEntry {
                path: path.clone(),
                kind,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Entries that would write something.
    pub fn changes(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.kind.is_change())
    }

    pub fn change_count(&self) -> usize {
        self.changes().count()
    }

    /// `true` when the destination already matches the rendering.
    pub fn is_converged(&self) -> bool {
        self.change_count() == 0
    }

    /// Human-readable form, one classified line at a time.
    pub fn lines(&self) -> Vec<PlanLine> {
        let mut out = Vec::new();
        for entry in self.changes() {
            if !out.is_empty() {
                out.push(PlanLine::new(PlanLineKind::Blank, String::new()));
            }
            entry.push_lines(&mut out);
        }
        out
    }
}

fn classify(
    path: &Path,
    rendered: &RenderedEntry,
    existing: Option<&DestinationEntry>,
) -> Result<PlanKind, DomainError> {
    let conflict = |reason: &str| DomainError::PathConflict {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    Ok(match (rendered, existing) {
        (RenderedEntry::Directory, None) => PlanKind::NewDirectory,
        (RenderedEntry::EmptyFile, None) => PlanKind::NewEmptyFile,
        (RenderedEntry::File(bytes), None) => PlanKind::NewFile {
            contents: bytes.clone(),
        },
        (RenderedEntry::Directory, Some(DestinationEntry::Directory)) => PlanKind::Unchanged,
        (RenderedEntry::Directory, Some(DestinationEntry::File(_))) => {
            return Err(conflict("template has a directory where a file exists"));
        }
        (_, Some(DestinationEntry::Directory)) => {
            return Err(conflict("template has a file where a directory exists"));
        }
        (file, Some(DestinationEntry::File(current))) => {
            let wanted = file.contents();
            if wanted == current.as_slice() {
                PlanKind::Unchanged
            } else {
                PlanKind::ModifiedFile {
                    contents: wanted.to_vec(),
                    diff: LineDiff::between(current, wanted),
                }
            }
        }
    })
}

impl PlanEntry {
    fn push_lines(&self, out: &mut Vec<PlanLine>) {
        let p = display_path(&self.path);
        let old = |note: Option<&str>| header("---", "old", &p, note);
        let new = |note: Option<&str>| header("+++", "new", &p, note);

        match &self.kind {
            PlanKind::NewDirectory => {
                out.push(PlanLine::new(PlanLineKind::OldHeader, old(Some("directory not found"))));
                out.push(PlanLine::new(PlanLineKind::NewHeader, new(Some("new directory"))));
            }
            PlanKind::NewEmptyFile => {
                out.push(PlanLine::new(PlanLineKind::OldHeader, old(Some("file not found"))));
                out.push(PlanLine::new(PlanLineKind::NewHeader, new(Some("new empty file"))));
            }
            PlanKind::NewFile { .. } => {
                out.push(PlanLine::new(PlanLineKind::OldHeader, old(Some("file not found"))));
                out.push(PlanLine::new(PlanLineKind::NewHeader, new(None)));
            }
            PlanKind::ModifiedFile { diff, .. } => {
                out.push(PlanLine::new(PlanLineKind::OldHeader, old(None)));
                out.push(PlanLine::new(PlanLineKind::NewHeader, new(None)));
                if diff.binary {
                    out.push(PlanLine::new(PlanLineKind::Note, BINARY_NOTE.to_string()));
                }
                for line in &diff.lines {
                    let (kind, sign) = match line.change {
                        LineChange::Removed => (PlanLineKind::Removed, '-'),
                        LineChange::Added => (PlanLineKind::Added, '+'),
                    };
                    out.push(PlanLine::new(
                        kind,
                        format!("{sign}{:4} {}", line.number, line.text),
                    ));
                    if line.missing_newline {
                        out.push(PlanLine::new(PlanLineKind::Note, NO_NEWLINE_NOTE.to_string()));
                    }
                }
            }
            PlanKind::Unchanged => {}
        }
    }
}

fn header(marker: &str, side: &str, path: &str, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{marker} {side}/{path}{ANNOTATION_GAP}({note})"),
        None => format!("{marker} {side}/{path}"),
    }
}

/// Forward-slash form of a relative path, independent of platform.
fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// One line of plan output, tagged for styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    pub kind: PlanLineKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLineKind {
    OldHeader,
    NewHeader,
    Removed,
    Added,
    /// Annotation under a file header, not a line of the file.
    Note,
    Blank,
}

impl PlanLine {
    fn new(kind: PlanLineKind, text: String) -> Self {
        Self { kind, text }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(entries: &[(&str, RenderedEntry)]) -> RenderedTree {
        let mut tree = RenderedTree::new();
        for (p, e) in entries {
            tree.insert(*p, e.clone()).unwrap();
        }
        tree
    }

    fn file(s: &str) -> RenderedEntry {
        RenderedEntry::file(s.as_bytes().to_vec())
    }

    #[test]
    fn everything_is_new_against_empty_destination() {
        let plan = Plan::diff(
            &rendered(&[
                ("my_project", RenderedEntry::Directory),
                ("my_project/__init__.py", RenderedEntry::EmptyFile),
                ("pyproject.toml", file("[project]\n")),
            ]),
            &DestinationTree::empty(),
        )
        .unwrap();

        let kinds: Vec<_> = plan.entries().iter().map(|e| &e.kind).collect();
        assert_eq!(kinds[0], &PlanKind::NewDirectory);
        assert_eq!(kinds[1], &PlanKind::NewEmptyFile);
        assert!(matches!(kinds[2], PlanKind::NewFile { .. }));

        let text = plan.to_string();
        assert!(text.contains("--- old/my_project    (directory not found)"));
        assert!(text.contains("+++ new/my_project    (new directory)"));
        assert!(text.contains("--- old/my_project/__init__.py    (file not found)"));
        assert!(text.contains("+++ new/my_project/__init__.py    (new empty file)"));
        assert!(text.contains("--- old/pyproject.toml    (file not found)"));
        assert!(text.contains("+++ new/pyproject.toml\n"));
    }

    #[test]
    fn modified_file_lists_changed_lines_only() {
        let dest = DestinationTree::empty().with_entry(
            "README.md",
            DestinationEntry::File(b"# p\n\nA\nB\nC\n".to_vec()),
        );
        let plan = Plan::diff(&rendered(&[("README.md", file("# p\n\nA\nX\nC\n"))]), &dest).unwrap();

        let lines: Vec<String> = plan.lines().into_iter().map(|l| l.text).collect();
        assert_eq!(
            lines,
            vec![
                "--- old/README.md".to_string(),
                "+++ new/README.md".to_string(),
                "-   4 B".to_string(),
                "+   4 X".to_string(),
            ]
        );
    }

    #[test]
    fn unchanged_entries_are_not_printed() {
        let dest = DestinationTree::empty()
            .with_entry("src", DestinationEntry::Directory)
            .with_entry("pyproject.toml", DestinationEntry::File(b"same\n".to_vec()));
        let plan = Plan::diff(
            &rendered(&[("src", RenderedEntry::Directory), ("pyproject.toml", file("same\n"))]),
            &dest,
        )
        .unwrap();

        assert_eq!(plan.entries().len(), 2);
        assert!(plan.is_converged());
        assert_eq!(plan.to_string(), "");
    }

    #[test]
    fn destination_only_paths_are_ignored() {
        let dest = DestinationTree::empty()
            .with_entry("extra.txt", DestinationEntry::File(b"mine".to_vec()));
        let plan = Plan::diff(&RenderedTree::new(), &dest).unwrap();
        assert!(plan.entries().is_empty());
    }

    #[test]
    fn kind_mismatch_is_a_conflict() {
        let dest = DestinationTree::empty().with_entry("x", DestinationEntry::File(Vec::new()));
        let err = Plan::diff(&rendered(&[("x", RenderedEntry::Directory)]), &dest).unwrap_err();
        assert!(matches!(err, DomainError::PathConflict { .. }));

        let dest = DestinationTree::empty().with_entry("x", DestinationEntry::Directory);
        assert!(Plan::diff(&rendered(&[("x", RenderedEntry::EmptyFile)]), &dest).is_err());
    }

    #[test]
    fn emptied_file_is_a_modification() {
        let dest = DestinationTree::empty().with_entry("a", DestinationEntry::File(b"x\n".to_vec()));
        let plan = Plan::diff(&rendered(&[("a", RenderedEntry::EmptyFile)]), &dest).unwrap();
        let PlanKind::ModifiedFile { contents, diff } = &plan.entries()[0].kind else {
            panic!("expected modification");
        };
        assert!(contents.is_empty());
        assert_eq!(diff.lines.len(), 1);
        assert_eq!(diff.lines[0].change, LineChange::Removed);
    }

    #[test]
    fn entries_are_separated_by_blank_lines() {
        let plan = Plan::diff(
            &rendered(&[("a", RenderedEntry::Directory), ("b", RenderedEntry::EmptyFile)]),
            &DestinationTree::empty(),
        )
        .unwrap();
        let kinds: Vec<_> = plan.lines().into_iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PlanLineKind::OldHeader,
                PlanLineKind::NewHeader,
                PlanLineKind::Blank,
                PlanLineKind::OldHeader,
                PlanLineKind::NewHeader,
            ]
        );
    }

    #[test]
    fn binary_modification_is_not_diffed_line_by_line() {
        let dest = DestinationTree::empty()
            .with_entry("logo.png", DestinationEntry::File(vec![0x89, b'P', 0, 0xff]));
        let plan = Plan::diff(
            &rendered(&[("logo.png", RenderedEntry::file(vec![0x89, b'P', 0, 0xfe]))]),
            &dest,
        )
        .unwrap();

        let lines: Vec<String> = plan.lines().into_iter().map(|l| l.text).collect();
        assert_eq!(
            lines,
            vec!["--- old/logo.png", "+++ new/logo.png", "Binary files differ"]
        );
    }

    #[test]
    fn missing_trailing_newline_is_marked() {
        let dest = DestinationTree::empty()
            .with_entry("a.txt", DestinationEntry::File(b"A\nC".to_vec()));
        let plan = Plan::diff(&rendered(&[("a.txt", file("A\nC\n"))]), &dest).unwrap();

        let lines: Vec<String> = plan.lines().into_iter().map(|l| l.text).collect();
        assert_eq!(
            lines,
            vec![
                "--- old/a.txt",
                "+++ new/a.txt",
                "-   2 C",
                "\\ No newline at end of file",
                "+   2 C",
            ]
        );
    }
}
