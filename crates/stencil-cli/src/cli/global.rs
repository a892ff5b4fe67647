//! Flags shared by `init`, `plan`, `apply` and `completions`.
//!
//! Flattened into [`super::Cli`] and marked `global`, so they may appear
//! before or after the subcommand.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, ValueEnum};

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log more about resolution, fetching and planning.
    #[arg(
        short = 'v',
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)",
        long_help = "Increase logging verbosity on stderr:
    (none)  - warnings and errors
    -v      - one line per lifecycle step
    -vv     - template resolution and fetch details
    -vvv    - everything, including per-entry events"
    )]
    pub verbose: u8,

    /// Only errors; status lines and plans are not printed.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print plans and status lines without ANSI colours.
    ///
    /// Any non-empty `NO_COLOR` other than `0`, `false`, `no` or `off` counts.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Read settings from FILE instead of the per-user config file.
    ///
    /// Values from `STENCIL_*` environment variables still take precedence.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How plans and status lines are written to stdout.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human when stdout is a terminal, plain otherwise.
    #[default]
    Auto,
    /// Coloured plan and status lines.
    Human,
    /// Same text, never coloured.
    Plain,
    /// One JSON document per command, nothing else on stdout.
    Json,
}
