//! Infrastructure adapters for stencil.
//!
//! This crate implements the ports defined in `stencil-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod config_store;
pub mod destination;
pub mod fetcher;
pub mod filesystem;
pub mod renderer;
pub mod template_loader;

// Re-export commonly used adapters
pub use config_store::TomlConfigStore;
pub use destination::FsDestinationReader;
pub use fetcher::{GithubFetcher, MirrorFetcher};
pub use filesystem::LocalFilesystem;
pub use renderer::SimpleRenderer;
pub use template_loader::FilesystemTemplateLoader;
