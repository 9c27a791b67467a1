//! Colors for outcome markers and report text.

use owo_colors::Style;

use crate::domain::OutcomeKind;

/// One style per kind of line the report prints. Plain by default.
#[derive(Default, Clone)]
pub struct Styles {
    /// Something on disk changed: install, update, move.
    pub changed: Style,
    /// Nothing happened to the plugin. Also used for hints.
    pub idle: Style,
    /// An undeclared plugin was deleted.
    pub removed: Style,
    pub failed: Style,
    pub warning: Style,
    /// Work still to come: plan lines and progress steps.
    pub pending: Style,
    pub summary: Style,
}

impl Styles {
    /// The colored stylesheet used on terminals.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            changed: Style::new().green(),
            idle: Style::new().dimmed(),
            removed: Style::new().yellow(),
            failed: Style::new().red().bold(),
            warning: Style::new().yellow(),
            pending: Style::new().cyan(),
            summary: Style::new().bold(),
        }
    }

    /// Style for a result line of the given kind.
    #[must_use]
    pub fn for_kind(&self, kind: OutcomeKind) -> Style {
        match kind {
            OutcomeKind::Error => self.failed,
            OutcomeKind::Removed => self.removed,
            OutcomeKind::Unchanged | OutcomeKind::Pinned => self.idle,
            OutcomeKind::Installed
            | OutcomeKind::Reinstalled
            | OutcomeKind::Moved
            | OutcomeKind::Updated => self.changed,
        }
    }
}
