//! `stencil plan` - show drift without touching the project.

use stencil_adapters::TomlConfigStore;
use stencil_core::application::SyncService;
use tracing::instrument;

use super::{
    PlanDocument, build_pipeline, destination, note_source_override, parse_overrides,
};
use crate::{
    cli::{GlobalArgs, PlanArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: PlanArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let dest = destination(args.dest);
    let overrides = parse_overrides(&args.overrides)?;
    note_source_override(&output, &overrides)?;

    output.info(&format!("Planning {} changes", dest.display()))?;

    let service = SyncService::new(build_pipeline(&config), Box::new(TomlConfigStore::new()));
    let report = service.plan(&dest, &overrides)?;

    output.plan(&report.plan)?;
    output.json(&PlanDocument {
        command: "plan",
        destination: &report.destination,
        source: &report.effective.project.src,
        changes: report.plan.change_count(),
        written: 0,
        entries: report.plan.changes().collect(),
    })?;

    if report.plan.is_converged() {
        output.success("No changes. The project matches its template.")?;
    }
    Ok(())
}
