//! `stencil init` - create a project from a template.

use std::collections::BTreeMap;

use stencil_adapters::TomlConfigStore;
use stencil_core::application::InitService;
use tracing::instrument;

use super::{PlanDocument, build_pipeline};
use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(dest = %args.dest.display()))]
pub fn execute(
    args: InitArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    output.info(&format!("Initializing {}", args.dest.display()))?;

    // Later `-a` flags win over earlier ones.
    let arguments: BTreeMap<String, String> = args.arguments.into_iter().collect();

    let service = InitService::new(build_pipeline(&config), Box::new(TomlConfigStore::new()));
    let report = service.init(&args.dest, &args.source, arguments)?;

    if let Some(description) = &report.description {
        output.info(&format!("Template: {description}"))?;
    }

    if !args.no_diff {
        output.plan(&report.plan)?;
    }
    output.json(&PlanDocument {
        command: "init",
        destination: &report.destination,
        source: &report.config.project.src,
        changes: report.plan.change_count(),
        written: report.plan.change_count(),
        entries: report.plan.changes().collect(),
    })?;

    output.print(&format!("Project name: {}", report.config.project.name))?;
    output.success(&format!("Successfully initialized {}", args.dest.display()))?;
    Ok(())
}
