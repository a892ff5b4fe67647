//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate a project from a template and keep it in sync",
    long_about = "stencil renders a template into a new project, remembers how it \
                  was rendered, and later shows and applies the drift between the \
                  project and a newer rendering of the template.",
    after_help = "EXAMPLES:\n\
        \x20 stencil init my-service gh://acme/templates/python -a package=core\n\
        \x20 stencil plan my-service\n\
        \x20 stencil plan my-service -o project.src=../templates/python\n\
        \x20 stencil apply my-service",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project from a template.
    #[command(
        about = "Create a new project from a template",
        after_help = "EXAMPLES:\n\
            \x20 stencil init my-app ./templates/python\n\
            \x20 stencil init my-app gh://acme/templates -a package=core -a port=8080"
    )]
    Init(InitArgs),

    /// Show what `apply` would change.
    #[command(
        about = "Show drift between a project and its template",
        after_help = "EXAMPLES:\n\
            \x20 stencil plan\n\
            \x20 stencil plan my-app -o project.src=../templates/python-v2\n\
            \x20 stencil plan my-app -o arguments.port=9090"
    )]
    Plan(PlanArgs),

    /// Write the drift into the project.
    #[command(
        about = "Apply template changes to a project",
        after_help = "EXAMPLES:\n\
            \x20 stencil apply\n\
            \x20 stencil apply my-app --no-diff"
    )]
    Apply(ApplyArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash > ~/.local/share/bash-completion/completions/stencil\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil\n\
            \x20 stencil completions fish > ~/.config/fish/completions/stencil.fish"
    )]
    Completions(CompletionsArgs),
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to create. Must not exist.
    #[arg(value_name = "DEST", help = "Directory to create")]
    pub dest: PathBuf,

    /// Local template path or `gh://owner/repo[/subpath]`.
    #[arg(value_name = "SOURCE", help = "Template source")]
    pub source: String,

    /// Template argument, repeatable.
    #[arg(
        short = 'a',
        long = "argument",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Set a template argument"
    )]
    pub arguments: Vec<(String, String)>,

    /// Do not print the plan.
    #[arg(long = "no-diff", help = "Do not print the diff")]
    pub no_diff: bool,
}

// ── plan / apply ──────────────────────────────────────────────────────────────

/// Arguments for `stencil plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Project directory (default: current directory).
    #[arg(value_name = "DEST", help = "Project directory")]
    pub dest: Option<PathBuf>,

    /// One-shot config override, repeatable. Never persisted.
    #[arg(
        short = 'o',
        long = "override",
        value_name = "SECTION.KEY=VALUE",
        help = "Override a config value for this run"
    )]
    pub overrides: Vec<String>,
}

/// Arguments for `stencil apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Project directory (default: current directory).
    #[arg(value_name = "DEST", help = "Project directory")]
    pub dest: Option<PathBuf>,

    /// One-shot config override, repeatable. Never persisted.
    #[arg(
        short = 'o',
        long = "override",
        value_name = "SECTION.KEY=VALUE",
        help = "Override a config value for this run"
    )]
    pub overrides: Vec<String>,

    /// Do not print the plan.
    #[arg(long = "no-diff", help = "Do not print the diff")]
    pub no_diff: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stencil completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── value parsers ─────────────────────────────────────────────────────────────

/// Parse `key=value`. Surrounding double quotes on the value are stripped.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }

    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    Ok((key.to_string(), value.to_string()))
}

// ── tests ─────────────────────────────────────────────────────────────────────
