//! Filesystem-based template loader.
//!
//! Parses the `stencil.toml` manifest of a template root and walks the
//! directory next to it into a domain [`TemplateTree`].
//!
//! # Directory layout expected
//!
//! ```text
//! stencil/
//! ├── stencil.toml               ← manifest (required, never rendered)
//! ├── {{ project_name }}/
//! │   └── __init__.py
//! ├── README.md.jinja
//! └── tests/
//! ```
//!
//! # `stencil.toml` format
//!
//! ```toml
//! [stencil]
//! name        = "{{ package }}_service"   # rendered against the binding
//! description = "Python service"          # optional
//!
//! [[arguments]]
//! key         = "package"
//! default     = "demo"                    # optional
//! description = "Top-level package name"  # optional
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use stencil_core::{
    application::ports::TemplateLoader,
    domain::{
        ArgumentDecl, DirectorySpec, DomainError, FileSpec, Manifest, TemplateContent,
        TemplateNode, TemplateTree,
    },
    error::StencilResult,
};

use crate::filesystem::map_io_error;

/// Directories never taken from a template root.
const IGNORED_DIRS: &[&str] = &[".git"];

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `stencil.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ManifestFile {
    pub stencil: StencilSection,
    #[serde(default)]
    pub arguments: Vec<ArgumentEntry>,
}

/// `[stencil]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct StencilSection {
    /// Project name expression, e.g. `"{{ package }}_service"`.
    pub name: String,
    pub description: Option<String>,
}

/// One entry under `[[arguments]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct ArgumentEntry {
    pub key: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

impl From<ArgumentEntry> for ArgumentDecl {
    fn from(entry: ArgumentEntry) -> Self {
        ArgumentDecl {
            key: entry.key,
            default: entry.default,
            description: entry.description,
        }
    }
}

/// Parse manifest text. `origin` only feeds error messages.
pub fn parse_manifest(raw: &str, origin: &Path) -> Result<Manifest, DomainError> {
    let file: ManifestFile = toml::from_str(raw).map_err(|e| {
        DomainError::InvalidManifest(format!("failed to parse '{}': {e}", origin.display()))
    })?;

    Manifest::new(
        file.stencil.name,
        file.stencil.description,
        file.arguments.into_iter().map(ArgumentDecl::from).collect(),
    )
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads manifests and template trees from local directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemTemplateLoader;

impl FilesystemTemplateLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read the children of `dir` into nodes, depth-first, sorted by name.
    fn read_level(&self, dir: &Path, skip: Option<&Path>) -> StencilResult<Vec<TemplateNode>> {
        let mut nodes = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(dir, e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if skip.is_some_and(|s| s.as_os_str() == entry.file_name()) {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if IGNORED_DIRS.contains(&name.as_str()) {
                    continue;
                }
                let mut spec = DirectorySpec::new(name);
                spec.children = self.read_level(path, None)?;
                nodes.push(TemplateNode::Directory(spec));
            } else if file_type.is_file() {
                let bytes = fs::read(path).map_err(|e| map_io_error(path, e, "read template file"))?;
                nodes.push(TemplateNode::File(FileSpec::new(
                    name,
                    TemplateContent::from_bytes(bytes),
                )));
            } else {
                debug!(path = %path.display(), "skipping special file");
            }
        }

        Ok(nodes)
    }
}

impl TemplateLoader for FilesystemTemplateLoader {
    #[instrument(skip(self), fields(path = %manifest_path.display()))]
    fn load_manifest(&self, manifest_path: &Path) -> StencilResult<Manifest> {
        let raw = fs::read_to_string(manifest_path)
            .map_err(|e| map_io_error(manifest_path, e, "read manifest"))?;
        let manifest = parse_manifest(&raw, manifest_path)?;
        debug!(
            name = manifest.name(),
            arguments = manifest.arguments().len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    fn load_tree(&self, root: &Path, manifest_path: &Path) -> StencilResult<TemplateTree> {
        // The manifest only ever sits at the top level of the root.
        let skip: Option<PathBuf> = manifest_path.file_name().map(PathBuf::from);
        let nodes = self.read_level(root, skip.as_deref())?;
        let tree = TemplateTree { nodes };
        debug!(nodes = tree.node_count(), "loaded template tree");
        Ok(tree)
    }
}

fn walk_error(dir: &Path, e: walkdir::Error) -> stencil_core::error::StencilError {
    let path = e.path().unwrap_or(dir).to_path_buf();
    match e.into_io_error() {
        Some(io) => map_io_error(&path, io, "read template directory"),
        None => map_io_error(
            &path,
            std::io::Error::other("filesystem loop detected"),
            "read template directory",
        ),
    }
}
