//! Named view filters
//!
//! The filters are mutually exclusive like a radio-button group. `None`
//! means no named filter is active and the user is browsing a single task
//! list instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterSelection {
    #[default]
    None,
    Today,
    Next7Days,
    Overdue,
    RecentlyCompleted,
    All,
}

impl FilterSelection {
    /// Every named filter, in sidebar order
    pub const NAMED: [FilterSelection; 5] = [
        FilterSelection::Today,
        FilterSelection::Next7Days,
        FilterSelection::Overdue,
        FilterSelection::RecentlyCompleted,
        FilterSelection::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterSelection::None => "none",
            FilterSelection::Today => "today",
            FilterSelection::Next7Days => "next7",
            FilterSelection::Overdue => "overdue",
            FilterSelection::RecentlyCompleted => "completed",
            FilterSelection::All => "all",
        }
    }

    pub fn is_named(&self) -> bool {
        !matches!(self, FilterSelection::None)
    }
}

/// Parse a filter name as typed on the command line
///
/// Accepts the canonical names plus a few aliases (`next-7-days`, `week`,
/// `recent`, `done`).
pub fn parse_filter_selection(token: &str) -> Result<FilterSelection, String> {
    let normalized = token.trim().to_lowercase();
    match normalized.as_str() {
        "none" | "list" => Ok(FilterSelection::None),
        "today" => Ok(FilterSelection::Today),
        "next7" | "next-7-days" | "next7days" | "week" => Ok(FilterSelection::Next7Days),
        "overdue" => Ok(FilterSelection::Overdue),
        "completed" | "recent" | "recently-completed" | "done" => Ok(FilterSelection::RecentlyCompleted),
        "all" => Ok(FilterSelection::All),
        _ => Err(format!(
            "Unknown filter: '{}'. Valid filters: today, next7, overdue, completed, all.",
            token
        )),
    }
}
