//! stdout for the lifecycle commands.
//!
//! Status lines and plans go to stdout; errors are printed by `main`.
//! In JSON mode only the JSON document is written, so stdout stays parseable.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;
use stencil_core::domain::{Plan, PlanLine, PlanLineKind};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Warning,
    Info,
}

impl Status {
    fn glyph(self) -> &'static str {
        match self {
            Self::Success => "\u{2713}",
            Self::Warning => "\u{26a0}",
            Self::Info => "\u{2139}",
        }
    }
}

/// Writes status lines, plans and JSON documents to stdout.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Resolve Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format == OutputFormat::Plain,
            term: Term::stdout(),
        }
    }

    /// Unadorned line; suppressed in quiet and JSON modes.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        self.status(None, msg)
    }

    /// `✓ <msg>`
    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status(Some(Status::Success), msg)
    }

    /// `⚠ <msg>`
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status(Some(Status::Warning), msg)
    }

    /// `ℹ <msg>`
    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status(Some(Status::Info), msg)
    }

    fn status(&self, kind: Option<Status>, msg: &str) -> io::Result<()> {
        if self.is_silent() {
            return Ok(());
        }
        let line = match kind {
            None => msg.to_string(),
            Some(kind) if self.no_color => format!("{} {msg}", kind.glyph()),
            Some(kind @ Status::Success) => {
                format!("{} {}", kind.glyph().green().bold(), msg.green())
            }
            Some(kind @ Status::Warning) => {
                format!("{} {}", kind.glyph().yellow().bold(), msg.yellow())
            }
            Some(kind @ Status::Info) => format!("{} {}", kind.glyph().blue().bold(), msg.blue()),
        };
        self.term.write_line(&line)
    }

    /// Print every changed entry of a plan, one diff line at a time.
    pub fn plan(&self, plan: &Plan) -> io::Result<()> {
        if self.is_silent() {
            return Ok(());
        }
        for line in plan.lines() {
            self.term.write_line(&self.paint(&line))?;
        }
        Ok(())
    }

    /// Write `value` as pretty JSON. Only does anything in JSON mode.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        if self.resolved_format != OutputFormat::Json {
            return Ok(());
        }
        let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
        self.term.write_line(&text)
    }

    fn paint(&self, line: &PlanLine) -> String {
        if self.no_color {
            return line.text.clone();
        }
        match line.kind {
            PlanLineKind::OldHeader => line.text.blue().bold().to_string(),
            PlanLineKind::NewHeader => line.text.white().bold().to_string(),
            PlanLineKind::Removed => line.text.red().to_string(),
            PlanLineKind::Added => line.text.green().to_string(),
            PlanLineKind::Note => line.text.dimmed().to_string(),
            PlanLineKind::Blank => String::new(),
        }
    }

    fn is_silent(&self) -> bool {
        self.quiet || self.resolved_format == OutputFormat::Json
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::domain::{DestinationTree, RenderedEntry, RenderedTree};

    fn make_manager(format: OutputFormat, no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color,
            config: None,
            output_format: format,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn plain_format_disables_color() {
        assert!(make_manager(OutputFormat::Plain, false).no_color);
        assert!(!make_manager(OutputFormat::Human, false).no_color);
        assert!(make_manager(OutputFormat::Human, true).no_color);
    }

    #[test]
    fn uncolored_plan_lines_are_verbatim() {
        let out = make_manager(OutputFormat::Plain, true);
        let rendered = RenderedTree::new()
            .with_entry("x", RenderedEntry::Directory)
            .unwrap();
        let plan = Plan::diff(&rendered, &DestinationTree::empty()).unwrap();

        let lines: Vec<String> = plan.lines().iter().map(|l| out.paint(l)).collect();
        assert_eq!(
            lines,
            vec![
                "--- old/x    (directory not found)",
                "+++ new/x    (new directory)"
            ]
        );
    }

    #[test]
    fn json_mode_silences_status_lines() {
        let out = make_manager(OutputFormat::Json, false);
        assert_eq!(out.resolved_format, OutputFormat::Json);
        assert!(out.is_silent());
        assert!(!make_manager(OutputFormat::Plain, false).is_silent());
    }
}
