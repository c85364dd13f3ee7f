//! List/table presentation adapter
//!
//! Turns the filter engine's ordered output into view rows. A row only
//! carries the task's identity and its search visibility; display columns
//! are read back from the pool at render time so they never drift from it.

use crate::models::{Task, TaskKey};
use crate::pool::TaskPool;
use crate::utils::format_local_date;
use chrono_tz::Tz;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub key: TaskKey,
    pub visible: bool,
}

impl ViewRow {
    pub fn resolve<'p>(&self, pool: &'p TaskPool) -> Option<&'p Task> {
        pool.get(&self.key)
    }
}

/// Case-insensitive substring match on the title; empty search matches all
pub fn matches_search(title: &str, search: &str) -> bool {
    search.is_empty() || title.to_lowercase().contains(&search.to_lowercase())
}

/// Build rows for an ordered task list
pub fn present(ordered: &[&Task], search: &str) -> Vec<ViewRow> {
    ordered
        .iter()
        .map(|task| ViewRow {
            key: task.key(),
            visible: matches_search(&task.title, search),
        })
        .collect()
}

/// Re-evaluate search visibility without touching row order. Rows whose
/// task has left the pool are hidden.
pub fn apply_search(rows: &mut [ViewRow], pool: &TaskPool, search: &str) {
    for row in rows.iter_mut() {
        row.visible = row
            .resolve(pool)
            .is_some_and(|task| matches_search(&task.title, search));
    }
}

/// Display text of the task's active date (see [`Task::active_date`])
pub fn format_active_date(task: &Task, tz: &Tz) -> Option<String> {
    if task.is_completed() {
        task.completed.map(|c| format_local_date(c, tz))
    } else {
        task.due_date().map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// One rendered table line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDisplay {
    pub task_list_id: String,
    pub id: String,
    pub title: String,
    pub task_list_name: String,
    pub date_label: &'static str,
    pub active_date: Option<String>,
    pub status: &'static str,
    pub priority: String,
}

impl RowDisplay {
    pub fn from_task(task: &Task, tz: &Tz) -> Self {
        Self {
            task_list_id: task.task_list_id.clone(),
            id: task.id.clone(),
            title: task.title.clone(),
            task_list_name: task.task_list_name.clone(),
            date_label: task.active_date_label(),
            active_date: format_active_date(task, tz),
            status: task.status.as_str(),
            priority: task.priority.clone(),
        }
    }
}

/// Render the visible rows from the current pool contents
pub fn render_rows(rows: &[ViewRow], pool: &TaskPool, tz: &Tz) -> Vec<RowDisplay> {
    rows.iter()
        .filter(|row| row.visible)
        .filter_map(|row| row.resolve(pool))
        .map(|task| RowDisplay::from_task(task, tz))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;

    fn pool() -> TaskPool {
        TaskPool::from_parts(
            vec![],
            vec![
                task("a", "1", "Buy Milk"),
                task("a", "2", "Walk dog"),
                task("b", "3", "Milkshake recipe"),
            ],
        )
    }

    fn visible_ids(rows: &[ViewRow]) -> Vec<&str> {
        rows.iter().filter(|r| r.visible).map(|r| r.key.task_id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        assert!(matches_search("Buy Milk", "milk"));
        assert!(matches_search("Buy Milk", "MILK"));
        assert!(matches_search("Buy Milk", "y m"));
        assert!(!matches_search("Buy Milk", "xyz"));
        assert!(matches_search("Buy Milk", ""));
    }

    #[test]
    fn test_present_keeps_order_and_marks_visibility() {
        let pool = pool();
        let ordered: Vec<&Task> = pool.tasks().collect();
        let rows = present(&ordered, "milk");
        assert_eq!(rows.len(), 3);
        assert_eq!(visible_ids(&rows), vec!["1", "3"]);
        assert_eq!(rows[1].key, TaskKey::new("a", "2"));
        assert!(!rows[1].visible);
    }

    #[test]
    fn test_clearing_search_restores_all_rows_in_order() {
        let pool = pool();
        let ordered: Vec<&Task> = pool.tasks().collect();
        let mut rows = present(&ordered, "dog");
        assert_eq!(visible_ids(&rows), vec!["2"]);

        apply_search(&mut rows, &pool, "");
        assert_eq!(visible_ids(&rows), vec!["1", "2", "3"]);
        assert_eq!(rows, present(&ordered, ""));
        assert_eq!(present(&ordered, ""), present(&ordered, ""));
    }

    #[test]
    fn test_render_reads_from_pool() {
        let mut pool = pool();
        let rows = {
            let ordered: Vec<&Task> = pool.tasks().collect();
            present(&ordered, "")
        };
        pool.update(&TaskKey::new("a", "2"), |t| t.title = "Walk cat".into());
        pool.remove(&TaskKey::new("b", "3"));

        let rendered = render_rows(&rows, &pool, &chrono_tz::UTC);
        let titles: Vec<&str> = rendered.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Buy Milk", "Walk cat"]);
    }

    #[test]
    fn test_active_date_column() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let open = due(task("a", "1", "x"), ts(2024, 6, 10, 0));
        assert_eq!(format_active_date(&open, &tz).as_deref(), Some("2024-06-10"));

        // Completion instants are shown in the viewer's timezone
        let closed = done(due(task("a", "2", "x"), ts(2024, 6, 10, 0)), Some(ts(2024, 6, 9, 2)));
        assert_eq!(format_active_date(&closed, &tz).as_deref(), Some("2024-06-08"));
        let row = RowDisplay::from_task(&closed, &tz);
        assert_eq!(row.date_label, "Completed");

        assert_eq!(format_active_date(&task("a", "3", "x"), &tz), None);
    }
}
