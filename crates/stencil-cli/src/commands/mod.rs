//! Command handlers.
//!
//! Each handler wires adapters into a core service, runs it, and reports
//! through the [`OutputManager`]. Adapter selection lives here so the core
//! never learns about configuration.

pub mod apply;
pub mod completions;
pub mod init;
pub mod plan;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stencil_adapters::{
    FilesystemTemplateLoader, GithubFetcher, LocalFilesystem, MirrorFetcher, SimpleRenderer,
    FsDestinationReader,
};
use stencil_core::{
    application::{Pipeline, SourceResolver, ports::TemplateFetcher},
    domain::{ConfigOverride, PlanEntry},
    error::StencilResult,
};
use tracing::debug;

use crate::{config::AppConfig, output::OutputManager};

/// Assemble the pipeline from the production adapters.
pub(crate) fn build_pipeline(config: &AppConfig) -> Pipeline {
    let fetcher: Box<dyn TemplateFetcher> = match &config.remote.mirror {
        Some(mirror) => {
            debug!(mirror = %mirror.display(), "remote sources served from mirror");
            Box::new(MirrorFetcher::new(mirror))
        }
        None => Box::new(GithubFetcher::new(
            config.github.api_url.clone(),
            config.github.token.clone(),
        )),
    };

    Pipeline::new(
        SourceResolver::new(fetcher),
        Box::new(FilesystemTemplateLoader::new()),
        Box::new(SimpleRenderer::new()),
        Box::new(FsDestinationReader::new()),
        Box::new(LocalFilesystem::new()),
    )
}

/// Parse `--override` values; the first bad one fails the command.
pub(crate) fn parse_overrides(raw: &[String]) -> StencilResult<Vec<ConfigOverride>> {
    raw.iter()
        .map(|s| s.parse::<ConfigOverride>().map_err(Into::into))
        .collect()
}

/// Warn when `project.src` is replaced for this run. The last override wins.
pub(crate) fn note_source_override(
    output: &OutputManager,
    overrides: &[ConfigOverride],
) -> io::Result<()> {
    let src = overrides.iter().rev().find_map(|o| match o {
        ConfigOverride::ProjectSrc(src) => Some(src),
        _ => None,
    });
    match src {
        Some(src) => output.warning(&format!(
            "Using template source {src} for this run only; the project config is unchanged"
        )),
        None => Ok(()),
    }
}

/// `plan`/`apply` default to the working directory.
pub(crate) fn destination(dest: Option<PathBuf>) -> PathBuf {
    dest.unwrap_or_else(|| PathBuf::from("."))
}

/// JSON document printed by every lifecycle command in `--output-format json`.
#[derive(Debug, Serialize)]
pub(crate) struct PlanDocument<'a> {
    pub command: &'static str,
    pub destination: &'a Path,
    pub source: &'a str,
    pub changes: usize,
    pub written: usize,
    pub entries: Vec<&'a PlanEntry>,
}
