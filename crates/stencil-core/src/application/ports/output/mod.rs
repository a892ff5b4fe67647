//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{
    DestinationEntry, Manifest, ProjectConfig, RemoteSource, RenderContext, RenderedTree,
    TemplateTree,
};
use crate::error::StencilResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem`
pub trait Filesystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StencilResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> StencilResult<()>;
}

/// Port for materializing a remote template on local disk.
///
/// Implemented by:
/// - `stencil_adapters::fetcher::GithubFetcher` (contents API)
/// - `stencil_adapters::fetcher::MirrorFetcher` (local mirror directory)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateFetcher: Send + Sync {
    /// Return a local directory holding the template at `source.template_path()`.
    ///
    /// The directory must stay readable for the lifetime of the fetcher.
    fn fetch(&self, source: &RemoteSource) -> StencilResult<PathBuf>;
}

/// Port for reading a template root.
///
/// Implemented by:
/// - `stencil_adapters::template_loader::FilesystemTemplateLoader`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateLoader: Send + Sync {
    /// Parse and validate the manifest file.
    fn load_manifest(&self, manifest_path: &Path) -> StencilResult<Manifest>;

    /// Walk the template root, excluding the manifest itself.
    fn load_tree(&self, root: &Path, manifest_path: &Path) -> StencilResult<TemplateTree>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `stencil_adapters::renderer::SimpleRenderer`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render every node name and content. Must not touch the filesystem.
    fn render(&self, tree: &TemplateTree, context: &RenderContext) -> StencilResult<RenderedTree>;
}

/// Port for reading what a destination holds at one path.
///
/// Called once per rendered path, possibly from several threads. Symlinks
/// are followed.
///
/// Implemented by:
/// - `stencil_adapters::destination::FsDestinationReader`
#[cfg_attr(test, mockall::automock)]
pub trait DestinationReader: Send + Sync {
    /// The entry at `root/path`, or `None` when nothing is there.
    fn read_entry(&self, root: &Path, path: &Path) -> StencilResult<Option<DestinationEntry>>;
}

/// Read half of the config store. All the sync service gets.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigReader: Send + Sync {
    /// Read `<project_root>/.stencil.toml`.
    fn read(&self, project_root: &Path) -> StencilResult<ProjectConfig>;
}

/// Write half of the config store. Only the init service holds one.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigWriter: Send + Sync {
    fn write(&self, project_root: &Path, config: &ProjectConfig) -> StencilResult<()>;
}
