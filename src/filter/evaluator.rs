//! Filter engine
//!
//! Produces the ordered subset of the pool to display for a given
//! [`FilterSelection`]. The engine is pure: the reference instant, the
//! reference timezone and the browsed list are all passed in through
//! [`FilterContext`], so results never depend on the wall clock.
//!
//! # Filters
//!
//! - `All` - every task, pool order
//! - `Today` - due on the reference day
//! - `Next7Days` - due within `[day, day + 7]`, ascending by due
//! - `Overdue` - due before the reference day, ascending by due (oldest first)
//! - `RecentlyCompleted` - completed within the window before the reference
//!   instant, descending by completion
//! - `None` - tasks of the browsed list, pool order
//!
//! Date filters only consider tasks that still need action. Whenever an
//! ordering key is absent the task sorts after every task that has one and
//! keeps its pool position relative to other keyless tasks.

use crate::filter::parser::FilterSelection;
use crate::models::Task;
use crate::pool::TaskPool;
use crate::utils::local_date;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::cmp::Ordering;

/// Default look-back window for `RecentlyCompleted`
pub const DEFAULT_COMPLETED_WINDOW_DAYS: i64 = 7;

/// Span of the `Next7Days` filter, inclusive of both ends
pub const UPCOMING_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct FilterContext {
    pub reference: DateTime<Utc>,
    pub timezone: Tz,
    pub completed_window: Duration,
    /// List browsed when no named filter is active
    pub task_list_id: Option<String>,
}

impl FilterContext {
    pub fn new(reference: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            reference,
            timezone,
            completed_window: Duration::days(DEFAULT_COMPLETED_WINDOW_DAYS),
            task_list_id: None,
        }
    }

    pub fn with_task_list(mut self, task_list_id: impl Into<String>) -> Self {
        self.task_list_id = Some(task_list_id.into());
        self
    }

    pub fn with_completed_window(mut self, window: Duration) -> Self {
        self.completed_window = window;
        self
    }

    /// The reference day in the reference timezone
    pub fn reference_date(&self) -> NaiveDate {
        local_date(self.reference, &self.timezone)
    }

    /// Earliest completion instant still counted as recent
    pub fn completed_since(&self) -> DateTime<Utc> {
        completed_since(self.reference, self.completed_window)
    }
}

/// `reference - window`, clamped to the earliest representable instant
pub fn completed_since(reference: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    reference
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Stable sort by an optional key; tasks without a key go last
pub fn order_by<F>(tasks: &mut [&Task], direction: SortDirection, key: F)
where
    F: Fn(&Task) -> Option<DateTime<Utc>>,
{
    tasks.sort_by(|a, b| match (key(a), key(b)) {
        (Some(ka), Some(kb)) => match direction {
            SortDirection::Ascending => ka.cmp(&kb),
            SortDirection::Descending => kb.cmp(&ka),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Does a task pass the selection's predicate (ignoring ordering)?
pub fn matches(task: &Task, selection: FilterSelection, ctx: &FilterContext) -> bool {
    let today = ctx.reference_date();
    let pending_due = || {
        if task.is_completed() {
            None
        } else {
            task.due_date()
        }
    };

    match selection {
        FilterSelection::All => true,
        FilterSelection::None => ctx
            .task_list_id
            .as_deref()
            .is_some_and(|id| task.task_list_id == id),
        FilterSelection::Today => pending_due().is_some_and(|d| d == today),
        FilterSelection::Next7Days => {
            let horizon = today + Duration::days(UPCOMING_DAYS);
            pending_due().is_some_and(|d| today <= d && d <= horizon)
        }
        FilterSelection::Overdue => pending_due().is_some_and(|d| d < today),
        FilterSelection::RecentlyCompleted => {
            task.is_completed() && task.completed.is_some_and(|c| c >= ctx.completed_since())
        }
    }
}

/// Filter and order the pool for display
pub fn filter_tasks<'p>(pool: &'p TaskPool, selection: FilterSelection, ctx: &FilterContext) -> Vec<&'p Task> {
    let mut selected: Vec<&Task> = pool
        .tasks()
        .filter(|task| matches(task, selection, ctx))
        .collect();

    match selection {
        FilterSelection::Next7Days | FilterSelection::Overdue => {
            order_by(&mut selected, SortDirection::Ascending, |t| t.due);
        }
        FilterSelection::RecentlyCompleted => {
            order_by(&mut selected, SortDirection::Descending, |t| t.completed);
        }
        FilterSelection::All | FilterSelection::Today | FilterSelection::None => {}
    }

    log::debug!("Filter '{}' selected {} of {} tasks", selection.as_str(), selected.len(), pool.len());
    selected
}
