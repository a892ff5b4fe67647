//! stencil Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for stencil, a
//! tool that generates a project from a template and later keeps it in sync
//! with newer renderings of that template.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stencil-cli (CLI)             │
//! │      init / plan / apply commands       │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (InitService, SyncService, Pipeline)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Fetcher, Loader, Renderer, Config...)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     stencil-adapters (Infrastructure)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Manifest, Binding, Trees, Plan, Config)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stencil_core::prelude::*;
//!
//! let pipeline = Pipeline::new(resolver, loader, renderer, destination, filesystem);
//! let service = SyncService::new(pipeline, config_store);
//! let report = service.plan(Path::new("./my-app"), &[])?;
//! print!("{}", report.plan);
//! ```

pub mod application;
pub mod domain;
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        InitService, Pipeline, SourceResolver, SyncService,
        ports::{
            ConfigReader, ConfigWriter, DestinationReader, Filesystem, TemplateFetcher,
            TemplateLoader, TemplateRenderer,
        },
    };
    pub use crate::domain::{
        ConfigOverride, Manifest, Plan, PlanKind, ProjectConfig, RenderContext, RenderedTree,
        SourceDescriptor, TemplateTree,
    };
    pub use crate::error::{StencilError, StencilResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
