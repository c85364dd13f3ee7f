//! Selection/detail synchronizer
//!
//! Two states: nothing selected, or exactly one task selected. The
//! selection is a weak reference (a [`TaskKey`]) into the pool; it is
//! resolved every time the details panel is populated.

use crate::models::TaskKey;
use crate::pool::TaskPool;
use crate::view::DetailsView;
use chrono_tz::Tz;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    TaskSelected(TaskKey),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionSync {
    state: SelectionState,
}

impl SelectionSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&TaskKey> {
        match &self.state {
            SelectionState::TaskSelected(key) => Some(key),
            SelectionState::NoSelection => None,
        }
    }

    /// The presentation layer's selection changed. Only a single row that
    /// still resolves in the pool selects a task; anything else clears.
    pub fn on_selection_changed(&mut self, selected: &[TaskKey], pool: &TaskPool) -> &SelectionState {
        self.state = match selected {
            [key] if pool.contains(key) => SelectionState::TaskSelected(key.clone()),
            _ => SelectionState::NoSelection,
        };
        &self.state
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::NoSelection;
    }

    /// Drop the selection when the selected task is no longer shown
    pub fn retain_if<F>(&mut self, still_shown: F)
    where
        F: FnOnce(&TaskKey) -> bool,
    {
        if let SelectionState::TaskSelected(key) = &self.state {
            if !still_shown(key) {
                log::debug!("Selected task {} left the view; clearing selection", key);
                self.state = SelectionState::NoSelection;
            }
        }
    }

    /// Details panel contents; `None` means the panel is hidden
    pub fn details(&self, pool: &TaskPool, tz: &Tz) -> Option<DetailsView> {
        self.selected()
            .and_then(|key| pool.get(key))
            .map(|task| DetailsView::from_task(task, tz))
    }
}
