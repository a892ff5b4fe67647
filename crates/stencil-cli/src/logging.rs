//! Tracing subscriber for the `stencil` binary.
//!
//! The library crates only emit events; this module decides what reaches
//! stderr. `RUST_LOG`, when set, replaces the flag-derived filter.
//!
//! | Flags     | Level |
//! |-----------|-------|
//! | (none)    | WARN  |
//! | `-v`      | INFO  |
//! | `-vv`     | DEBUG |
//! | `-vvv`    | TRACE |
//! | `--quiet` | ERROR |

use std::io::{self, IsTerminal as _};

use anyhow::Context as _;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Crates whose events pass the filter; dependencies stay silent.
const TARGETS: &[&str] = &["stencil", "stencil_core", "stencil_adapters"];

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = derive_level(args);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(filter_directives(level))
            .context("invalid built-in log directives")?,
    };

    // Targets help tell core and adapter events apart once debugging.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(level >= LevelFilter::DEBUG)
        .with_ansi(!args.no_color && io::stderr().is_terminal())
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("a tracing subscriber is already installed")
}

fn filter_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn derive_level(args: &GlobalArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
