use std::time::Duration;

use serde::Serialize;

use crate::{record::RecordId, search::Evaluation};

/// Delay before the renderer should scroll the selection into view, giving
/// its layout pass time to settle after a rebuild.
pub const SCROLL_DELAY: Duration = Duration::from_millis(50);

/// An instruction for the rendering side, issued in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Same ids in the same order; redraw rows to pick up field edits.
    RefreshInPlace,
    /// Drop the rendered rows and show these instead.
    Replace { ids: Vec<RecordId> },
    /// Select this id again without recording it in selection history.
    Reselect { id: RecordId },
    /// Once `after_ms` has elapsed, scroll the selected row into view.
    ScrollIntoView { id: RecordId, after_ms: u64 },
}

impl RenderCommand {
    fn scroll(id: RecordId) -> Self {
        RenderCommand::ScrollIntoView {
            id,
            after_ms: SCROLL_DELAY.as_millis() as u64,
        }
    }

    pub fn is_rebuild(&self) -> bool {
        matches!(self, RenderCommand::Replace { .. })
    }
}

/// What one materialization produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub commands: Vec<RenderCommand>,
    /// Records that satisfied the query, before the threshold.
    pub hit_count: usize,
}

impl Materialized {
    pub fn rebuilt(&self) -> bool {
        self.commands.iter().any(RenderCommand::is_rebuild)
    }
}

/// The currently rendered result list and its selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultView {
    rendered: Vec<RecordId>,
    selected: Option<RecordId>,
}

impl ResultView {
    pub fn rendered(&self) -> &[RecordId] {
        &self.rendered
    }

    pub fn selected(&self) -> Option<&RecordId> {
        self.selected.as_ref()
    }

    /// Select a rendered record. Ids not on screen are ignored.
    pub fn select(&mut self, id: RecordId) -> bool {
        if self.rendered.contains(&id) {
            self.selected = Some(id);
            true
        } else {
            tracing::debug!(%id, "ignoring selection of unrendered id");
            false
        }
    }

    /// Reconcile the rendered list with a fresh evaluation.
    pub fn materialize(&mut self, evaluation: &Evaluation) -> Materialized {
        let next = evaluation.ids();
        let hit_count = evaluation.hit_count;

        if next == self.rendered {
            return Materialized {
                commands: vec![RenderCommand::RefreshInPlace],
                hit_count,
            };
        }

        tracing::debug!(
            before = self.rendered.len(),
            after = next.len(),
            "rebuilding result list"
        );
        let mut commands = vec![RenderCommand::Replace { ids: next.clone() }];
        self.rendered = next;

        if let Some(id) = self.selected.take() {
            if self.rendered.contains(&id) {
                commands.push(RenderCommand::Reselect { id: id.clone() });
                commands.push(RenderCommand::scroll(id.clone()));
                self.selected = Some(id);
            } else {
                tracing::debug!(%id, "selection no longer in results");
            }
        }

        Materialized {
            commands,
            hit_count,
        }
    }
}
