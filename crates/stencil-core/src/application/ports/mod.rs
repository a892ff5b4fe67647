//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stencil-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: file operations
//!   - `TemplateFetcher`: remote template download
//!   - `TemplateLoader`: manifest + tree parsing
//!   - `TemplateRenderer`: template rendering
//!   - `DestinationReader`: destination entry at one rendered path
//!   - `ConfigReader` / `ConfigWriter`: the `.stencil.toml` store
//!
//! - **Driving (Input) Ports**: the services in `crate::application::services`

pub mod output;

pub use output::{
    ConfigReader, ConfigWriter, DestinationReader, Filesystem, TemplateFetcher, TemplateLoader,
    TemplateRenderer,
};

#[cfg(test)]
pub use output::{
    MockConfigReader, MockConfigWriter, MockDestinationReader, MockTemplateFetcher,
    MockTemplateLoader, MockTemplateRenderer,
};
