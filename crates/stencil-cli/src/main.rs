//! # stencil CLI
//!
//! Generate a project from a template, then keep it in sync.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Initialise the tracing subscriber (logging).
//! 3. Load configuration (defaults + file + env).
//! 4. Build the [`OutputManager`].
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                         |
//! |------|---------------------------------|
//! |  0   | Success                         |
//! |  1   | Any handled failure             |
//! |  2   | Command-line usage error (clap) |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // Missing .env is fine; real deployments use the environment directly.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version land here too, with exit code 0.
            let _ = e.print();
            return ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(2));
        }
    };

    // ── 2. Initialise tracing ─────────────────────────────────────────────
    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let verbose = cli.global.verbose > 0;
    let no_color = cli.global.no_color;

    // ── 3. Load configuration ─────────────────────────────────────────────
    let config = match AppConfig::load(cli.global.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) => return handle_error(e, verbose, no_color),
    };

    // ── 4. Build output manager ───────────────────────────────────────────
    let output = OutputManager::new(&cli.global, &config);
    let no_color = no_color || config.output.no_color;

    // ── 5. Dispatch + 6. Error handling ──────────────────────────────────
    match run(cli, config, output) {
        Ok(()) => {
            info!("stencil completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose, no_color),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Init(cmd) => commands::init::execute(cmd, cli.global, config, output),
        Commands::Plan(cmd) => commands::plan::execute(cmd, cli.global, config, output),
        Commands::Apply(cmd) => commands::apply::execute(cmd, cli.global, config, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
    }
}

/// Report `err` on stderr and turn it into the process exit code.
fn handle_error(err: CliError, verbose: bool, no_color: bool) -> ExitCode {
    err.log();

    let colored = !no_color && std::io::stderr().is_terminal();
    let msg = if colored {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn init_collects_arguments_in_order() {
        let cli = Cli::try_parse_from([
            "stencil", "init", "out", "./tmpl", "-a", "x=1", "--argument", "y=\"two\"",
        ])
        .unwrap();
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(
            args.arguments,
            vec![
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "two".to_string())
            ]
        );
        assert!(!args.no_diff);
    }

    #[test]
    fn plan_destination_is_optional() {
        let cli = Cli::try_parse_from(["stencil", "plan", "-o", "project.src=../b"]).unwrap();
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert!(args.dest.is_none());
        assert_eq!(args.overrides, vec!["project.src=../b".to_string()]);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["stencil", "apply", "out", "-q", "--no-diff"]).unwrap();
        assert!(cli.global.quiet);
        assert!(Cli::try_parse_from(["stencil", "-q", "-v", "plan"]).is_err());
    }

    #[test]
    fn no_color_flag_takes_no_value() {
        let cli = Cli::try_parse_from(["stencil", "plan", "--no-color", "out"]).unwrap();
        assert!(cli.global.no_color);
    }

    #[test]
    fn cli_version_matches_cargo() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(env!("CARGO_PKG_VERSION")));
    }
}
