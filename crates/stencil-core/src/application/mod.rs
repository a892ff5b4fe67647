//! Application layer for stencil.
//!
//! This layer contains:
//! - **Services**: use case orchestration (InitService, SyncService)
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! template logic itself. Those rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    BindingLayers, InitReport, InitService, Pipeline, ProjectName, ResolvedTemplate,
    SourceResolver, SyncReport, SyncService,
};

pub use ports::{
    ConfigReader, ConfigWriter, DestinationReader, Filesystem, TemplateFetcher, TemplateLoader,
    TemplateRenderer,
};

pub use error::ApplicationError;
