use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;
use crate::domain::project_config::CONFIG_FILE;
use crate::domain::{DestinationEntry, DestinationTree, user_content};

/// Virtual output of rendering a template against a binding.
///
/// Keys are relative paths; `BTreeMap<PathBuf, _>` orders them component by
/// component, so a directory always sorts before its children. Produced fresh
/// on every run and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTree {
    entries: BTreeMap<PathBuf, RenderedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedEntry {
    Directory,
    EmptyFile,
    File(Vec<u8>),
}

impl RenderedEntry {
    /// Empty content becomes `EmptyFile`.
    pub fn file(contents: Vec<u8>) -> Self {
        if contents.is_empty() {
            Self::EmptyFile
        } else {
            Self::File(contents)
        }
    }

    pub fn contents(&self) -> &[u8] {
        match self {
            Self::File(bytes) => bytes,
            Self::Directory | Self::EmptyFile => &[],
        }
    }
}

impl RenderedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, entry: RenderedEntry) -> Result<(), DomainError> {
        let path = path.into();
        if path.is_absolute() || path.as_os_str().is_empty() {
            return Err(DomainError::InvalidRenderedPath {
                template: path.display().to_string(),
                rendered: path.display().to_string(),
            });
        }
        if self.entries.contains_key(&path) {
            return Err(DomainError::DuplicatePath { path });
        }
        self.entries.insert(path, entry);
        Ok(())
    }

    pub fn with_entry(mut self, path: impl Into<PathBuf>, entry: RenderedEntry) -> Result<Self, DomainError> {
        self.insert(path, entry)?;
        Ok(self)
    }

    pub fn get(&self, path: &Path) -> Option<&RenderedEntry> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &RenderedEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Refuse a tree that would overwrite the project config.
    pub fn check_reserved(&self) -> Result<(), DomainError> {
        let config = Path::new(CONFIG_FILE);
        if self.entries.contains_key(config) {
            return Err(DomainError::ReservedPath {
                path: config.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Carry user content blocks over from the files already on disk.
    ///
    /// Returns how many files took content from the destination.
    pub fn preserve_user_content(&mut self, destination: &DestinationTree) -> usize {
        let mut merged = 0;
        for (path, entry) in self.entries.iter_mut() {
            let (RenderedEntry::File(bytes), Some(DestinationEntry::File(current))) =
                (&*entry, destination.get(path))
            else {
                continue;
            };
            let (Ok(rendered), Ok(current)) =
                (std::str::from_utf8(bytes), std::str::from_utf8(current))
            else {
                continue;
            };
            if let Some(text) = user_content::preserve(rendered, current) {
                *entry = RenderedEntry::file(text.into_bytes());
                merged += 1;
            }
        }
        merged
    }
}

/// Check that a rendered name is one normal path component.
pub fn validate_segment(template: &str, rendered: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidRenderedPath {
        template: template.to_string(),
        rendered: rendered.to_string(),
    };

    if rendered.is_empty() || rendered.contains('/') || rendered.contains('\\') {
        return Err(invalid());
    }

    let mut components = Path::new(rendered).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_is_empty_file() {
        assert_eq!(RenderedEntry::file(Vec::new()), RenderedEntry::EmptyFile);
        assert_eq!(
            RenderedEntry::file(b"x".to_vec()),
            RenderedEntry::File(b"x".to_vec())
        );
    }

    #[test]
    fn rejects_duplicates() {
        let mut tree = RenderedTree::new();
        tree.insert("a", RenderedEntry::Directory).unwrap();
        assert!(matches!(
            tree.insert("a", RenderedEntry::EmptyFile),
            Err(DomainError::DuplicatePath { .. })
        ));
    }

    #[test]
    fn directories_sort_before_children() {
        let tree = RenderedTree::new()
            .with_entry("a.txt", RenderedEntry::EmptyFile)
            .unwrap()
            .with_entry("a/b", RenderedEntry::EmptyFile)
            .unwrap()
            .with_entry("a", RenderedEntry::Directory)
            .unwrap();
        let order: Vec<_> = tree.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(
            order,
            vec![PathBuf::from("a"), PathBuf::from("a/b"), PathBuf::from("a.txt")]
        );
    }

    #[test]
    fn segment_validation() {
        assert!(validate_segment("{{ x }}", "my_project").is_ok());
        assert!(validate_segment("{{ x }}", ".github").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert!(validate_segment("{{ x }}", bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn config_file_at_root_is_reserved() {
        let tree = RenderedTree::new()
            .with_entry("sub", RenderedEntry::Directory)
            .unwrap()
            .with_entry("sub/.stencil.toml", RenderedEntry::EmptyFile)
            .unwrap();
        assert!(tree.check_reserved().is_ok());

        let tree = tree.with_entry(CONFIG_FILE, RenderedEntry::EmptyFile).unwrap();
        assert_eq!(
            tree.check_reserved(),
            Err(DomainError::ReservedPath {
                path: PathBuf::from(".stencil.toml")
            })
        );
    }

    #[test]
    fn user_content_comes_from_destination() {
        let block = "# begin-user-content:main\n# user content here\n# end-user-content:main\n";
        let mut tree = RenderedTree::new()
            .with_entry("main.py", RenderedEntry::file(format!("import os\n{block}").into_bytes()))
            .unwrap()
            .with_entry("new.py", RenderedEntry::file(block.as_bytes().to_vec()))
            .unwrap();
        let destination = DestinationTree::empty().with_entry(
            "main.py",
            DestinationEntry::File(
                b"# begin-user-content:main\nrun()\n# end-user-content:main\n".to_vec(),
            ),
        );

        assert_eq!(tree.preserve_user_content(&destination), 1);
        assert_eq!(
            tree.get(Path::new("main.py")).unwrap().contents(),
            b"import os\n# begin-user-content:main\nrun()\n# end-user-content:main\n"
        );
        assert_eq!(tree.get(Path::new("new.py")).unwrap().contents(), block.as_bytes());
    }
}
