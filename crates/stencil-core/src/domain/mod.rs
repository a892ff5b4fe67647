// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for stencil.
//!
//! Pure logic only: no filesystem, no network. Everything that touches the
//! outside world goes through the ports in `crate::application::ports`.
//!
//! ## Pipeline
//!
//! ```text
//! SourceDescriptor ─► Manifest ─► ArgumentBinding ─► RenderContext
//!                                                        │
//!                      TemplateTree ─────────────────────┤
//!                                                        ▼
//!            DestinationTree ─────────────────────► RenderedTree
//!                   │                                    │
//!                   └──────────► Plan::diff ◄────────────┘
//! ```
pub mod binding;
pub mod destination;
pub mod error;
pub mod manifest;
pub mod plan;
pub mod project_config;
pub mod render;
pub mod rendered;
pub mod source;
pub mod template;
pub mod user_content;

pub use binding::{ArgumentBinding, BoundValue, SubstitutionMode, bind};
pub use destination::{DestinationEntry, DestinationTree};
pub use error::{DomainError, ErrorCategory};
pub use manifest::{ArgumentDecl, MANIFEST_FILE, Manifest, PROJECT_NAME_VAR};
pub use plan::{
    DiffLine, LineChange, LineDiff, Plan, PlanEntry, PlanKind, PlanLine, PlanLineKind,
};
pub use project_config::{
    CONFIG_FILE, ConfigOverride, ProjectConfig, SCHEMA_VERSION, argument_overrides,
};
pub use render::RenderContext;
pub use rendered::{RenderedEntry, RenderedTree, validate_segment};
pub use source::{DEFAULT_REMOTE_SUBPATH, RemoteHost, RemoteSource, SourceDescriptor};
pub use template::{DirectorySpec, FileSpec, TemplateContent, TemplateNode, TemplateTree};
pub use user_content::UserContent;
