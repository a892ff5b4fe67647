//! `stencil apply` - write drift into the project.

use stencil_adapters::TomlConfigStore;
use stencil_core::application::SyncService;
use tracing::instrument;

use super::{
    PlanDocument, build_pipeline, destination, note_source_override, parse_overrides,
};
use crate::{
    cli::{ApplyArgs, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: ApplyArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let dest = destination(args.dest);
    let overrides = parse_overrides(&args.overrides)?;
    note_source_override(&output, &overrides)?;

    let service = SyncService::new(build_pipeline(&config), Box::new(TomlConfigStore::new()));
    let report = service.apply(&dest, &overrides, |report| -> CliResult<()> {
        output.info(&format!(
            "Applying changes from {} to {}",
            report.effective.project.src,
            dest.display()
        ))?;
        if !args.no_diff {
            output.plan(&report.plan)?;
        }
        Ok(())
    })?;

    output.json(&PlanDocument {
        command: "apply",
        destination: &report.destination,
        source: &report.effective.project.src,
        changes: report.plan.change_count(),
        written: report.written,
        entries: report.plan.changes().collect(),
    })?;

    output.success(&format!(
        "Successfully applied {} changes to {}",
        report.written,
        dest.display()
    ))?;
    Ok(())
}
