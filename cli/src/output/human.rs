//! Human-readable terminal renderer.

use owo_colors::{OwoColorize as _, Style};

use crate::application::services::plan::{PlanReport, PlannedAction};
use crate::domain::outcome::{Move, Outcome, SyncReport, SyncResult, Tally};
use crate::domain::plan::Action;
use crate::output::{OutputContext, Styles};

/// Printed after the results when any plugin failed.
pub const FAILURE_HELP: &str = "\
Some plugins could not be synced. Check that:
    - you can write to the plugin directory,
    - your network connection is up,
    - git can reach each repository without prompting (set up a credential helper or SSH agent).";

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        println!("packsync {version}");
    }

    /// Render the outcome of a sync run.
    ///
    /// In quiet mode only failures, warnings, and the help footer appear.
    pub fn render_report(&self, report: &SyncReport) {
        let styles = &self.ctx.styles;
        for result in &report.results {
            if self.ctx.quiet && !result.outcome.is_failure() {
                continue;
            }
            println!("{}", result_line(result, styles));
        }

        for warning in &report.warnings {
            println!("  {} {warning}", "⚠".style(styles.warning));
        }

        if !self.ctx.quiet {
            println!();
            println!("  {}", summary_line(&report.tally).style(styles.summary));
        }

        if report.tally.errors > 0 {
            println!();
            println!("{}", FAILURE_HELP.style(styles.idle));
        }
    }

    /// Render a dry run.
    pub fn render_plan(&self, plan: &PlanReport) {
        let styles = &self.ctx.styles;
        if !self.ctx.quiet {
            for planned in &plan.actions {
                println!("{}", plan_line(planned, styles));
            }
            for orphan in &plan.orphans {
                println!("  {} {orphan}: remove", "−".style(styles.removed));
            }
            if plan.actions.is_empty() && plan.orphans.is_empty() {
                println!("  nothing declared and nothing installed");
            }
        }
        for warning in &plan.warnings {
            println!("  {} {warning}", "⚠".style(styles.warning));
        }
    }
}

/// One line per plugin, e.g. `  ✓ vim-surround: updated 1a2b3c4..5d6e7f8`.
#[must_use]
pub fn result_line(result: &SyncResult, styles: &Styles) -> String {
    let (mark, style) = marker(&result.outcome, styles);
    format!(
        "  {} {}: {}",
        mark.style(style),
        result.plugin,
        describe(&result.outcome)
    )
}

fn marker(outcome: &Outcome, styles: &Styles) -> (&'static str, Style) {
    let glyph = match outcome {
        Outcome::Failed { .. } => "✗",
        Outcome::Unchanged | Outcome::Pinned { moved: None } => "·",
        Outcome::Removed => "−",
        _ => "✓",
    };
    // A pinned plugin that was relocated still changed on disk.
    let style = if outcome.relocation().is_some() {
        styles.changed
    } else {
        styles.for_kind(outcome.kind())
    };
    (glyph, style)
}

/// Outcome detail without the plugin name.
#[must_use]
pub fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Installed => "installed".to_string(),
        Outcome::Reinstalled { reason } => format!("reinstalled ({reason})"),
        Outcome::Removed => "removed".to_string(),
        Outcome::Updated { from, to, moved } => {
            let mut text = format!("updated {}..{}", from.short(), to.short());
            if let Some(mv) = moved {
                text.push_str(" and ");
                text.push_str(&moved_phrase(*mv));
            }
            text
        }
        Outcome::Moved { moved } => moved_phrase(*moved),
        Outcome::Pinned { moved: None } => "pinned (no update attempted)".to_string(),
        Outcome::Pinned { moved: Some(mv) } => {
            format!("{} and pinned (no update attempted)", moved_phrase(*mv))
        }
        Outcome::Unchanged => "already up-to-date".to_string(),
        Outcome::Failed { cause } => format!("failed: {cause}"),
    }
}

fn moved_phrase(mv: Move) -> String {
    format!("moved from {}/ to {}/", mv.from, mv.to)
}

/// Non-zero counts in a fixed order, or a note that nothing happened.
#[must_use]
pub fn summary_line(tally: &Tally) -> String {
    let counts = [
        (tally.installed, "installed"),
        (tally.reinstalled, "reinstalled"),
        (tally.updated, "updated"),
        (tally.moved, "moved"),
        (tally.removed, "removed"),
        (tally.pinned, "pinned"),
        (tally.unchanged, "unchanged"),
        (tally.errors, "failed"),
        (tally.warnings, "warnings"),
    ];
    let parts: Vec<String> = counts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{n} {label}"))
        .collect();
    if parts.is_empty() {
        "nothing to do".to_string()
    } else {
        parts.join(", ")
    }
}

fn plan_line(planned: &PlannedAction, styles: &Styles) -> String {
    let text = match &planned.action {
        Action::Install => "install".to_string(),
        Action::Reinstall { reason } => format!("reinstall ({reason})"),
        Action::Refresh {
            relocate: None,
            pinned: true,
        } => "pinned, nothing to do".to_string(),
        Action::Refresh {
            relocate: Some(mv),
            pinned: true,
        } => format!("move {}/ to {}/ (pinned, no update)", mv.from, mv.to),
        Action::Refresh {
            relocate: None,
            pinned: false,
        } => "update".to_string(),
        Action::Refresh {
            relocate: Some(mv),
            pinned: false,
        } => format!("move {}/ to {}/, then update", mv.from, mv.to),
    };
    format!("  {} {}: {text}", "→".style(styles.pending), planned.plugin)
}
