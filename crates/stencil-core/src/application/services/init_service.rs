//! Init Service - materializes a new project from a template.
//!
//! Workflow:
//! 1. Refuse an existing destination
//! 2. Resolve, bind (no persisted layer) and render
//! 3. Diff against an empty tree
//! 4. Create the destination and write every entry
//! 5. Persist `.stencil.toml`
//!
//! This is the only service that holds a [`ConfigWriter`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::ConfigWriter,
        services::pipeline::{BindingLayers, Pipeline, ProjectName},
    },
    domain::{Plan, ProjectConfig, SourceDescriptor},
    error::StencilResult,
};

/// Outcome of a successful `init`.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub destination: PathBuf,
    pub config: ProjectConfig,
    /// The manifest's description of the template, if any.
    pub description: Option<String>,
    pub plan: Plan,
}

pub struct InitService {
    pipeline: Pipeline,
    config: Box<dyn ConfigWriter>,
}

impl InitService {
    pub fn new(pipeline: Pipeline, config: Box<dyn ConfigWriter>) -> Self {
        Self { pipeline, config }
    }

    /// Create `dest` from `source`, binding `arguments` on top of defaults.
    #[instrument(skip_all, fields(dest = %dest.display(), source = %source))]
    pub fn init(
        &self,
        dest: &Path,
        source: &str,
        arguments: BTreeMap<String, String>,
    ) -> StencilResult<InitReport> {
        if self.pipeline.filesystem().exists(dest) {
            return Err(ApplicationError::DestinationExists {
                path: dest.to_path_buf(),
            }
            .into());
        }

        let descriptor: SourceDescriptor = source.parse()?;
        let layers = BindingLayers {
            cli: arguments,
            ..BindingLayers::default()
        };

        let rendering = self
            .pipeline
            .compute(&descriptor, None, &layers, &ProjectName::FromManifest)?;

        self.pipeline.filesystem().create_dir_all(dest)?;
        self.pipeline.write_plan(dest, &rendering.plan)?;

        let config = ProjectConfig::new(
            rendering.project_name,
            descriptor.as_str(),
            rendering.binding.to_raw_map(),
        );
        self.config.write(dest, &config)?;

        info!(project = %config.project.name, "project initialised");
        Ok(InitReport {
            destination: dest.to_path_buf(),
            config,
            description: rendering.description,
            plan: rendering.plan,
        })
    }
}
