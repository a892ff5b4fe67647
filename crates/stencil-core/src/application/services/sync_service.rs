//! Sync Service - `plan` and `apply` against an initialised project.
//!
//! Holds a [`ConfigReader`] only: neither operation can change the persisted
//! config, whatever overrides are passed.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::ConfigReader,
        services::pipeline::{BindingLayers, Pipeline, ProjectName},
    },
    domain::{CONFIG_FILE, ConfigOverride, Plan, ProjectConfig, argument_overrides},
    error::{StencilError, StencilResult},
};

/// Outcome of `plan` / `apply`.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub destination: PathBuf,
    /// Effective config for this run (overrides applied, never persisted).
    pub effective: ProjectConfig,
    pub plan: Plan,
    /// Number of entries written; always 0 for `plan`.
    pub written: usize,
}

pub struct SyncService {
    pipeline: Pipeline,
    config: Box<dyn ConfigReader>,
}

impl SyncService {
    pub fn new(pipeline: Pipeline, config: Box<dyn ConfigReader>) -> Self {
        Self { pipeline, config }
    }

    /// Compute drift without writing anything.
    #[instrument(skip_all, fields(dest = %dest.display()))]
    pub fn plan(&self, dest: &Path, overrides: &[ConfigOverride]) -> StencilResult<SyncReport> {
        self.prepare(dest, overrides)
    }

    /// Compute drift, then write every change.
    ///
    /// `announce` sees the finished plan before anything is written; an
    /// error from it stops the run with the project untouched.
    #[instrument(skip_all, fields(dest = %dest.display()))]
    pub fn apply<E, F>(
        &self,
        dest: &Path,
        overrides: &[ConfigOverride],
        announce: F,
    ) -> Result<SyncReport, E>
    where
        E: From<StencilError>,
        F: FnOnce(&SyncReport) -> Result<(), E>,
    {
        let mut report = self.prepare(dest, overrides)?;
        announce(&report)?;
        report.written = self.pipeline.write_plan(dest, &report.plan)?;
        info!(written = report.written, "changes applied");
        Ok(report)
    }

    /// Read the config, layer overrides and compute the plan.
    fn prepare(&self, dest: &Path, overrides: &[ConfigOverride]) -> StencilResult<SyncReport> {
        let config_path = dest.join(CONFIG_FILE);
        if !self.pipeline.filesystem().is_file(&config_path) {
            return Err(ApplicationError::ConfigMissing { path: config_path }.into());
        }

        let persisted = self.config.read(dest)?;
        let effective = persisted.with_overrides(overrides)?;
        if effective.project.src != persisted.project.src {
            warn!(
                persisted = %persisted.project.src,
                effective = %effective.project.src,
                "using overridden template source for this run"
            );
        }

        let layers = BindingLayers {
            persisted: effective.arguments.clone(),
            overrides: argument_overrides(overrides),
            ..BindingLayers::default()
        };
        let rendering = self.pipeline.compute(
            &effective.source()?,
            Some(dest),
            &layers,
            &ProjectName::Fixed(effective.project.name.clone()),
        )?;

        Ok(SyncReport {
            destination: dest.to_path_buf(),
            effective,
            plan: rendering.plan,
            written: 0,
        })
    }
}
