//! Remote task service contract
//!
//! The session controller talks to the remote task store only through
//! [`TaskService`]. Pagination, credentials, timeouts and retries belong to
//! the implementation; the core sees a call either succeed or fail.

pub mod snapshot;
pub mod export;

pub use snapshot::*;
pub use export::*;

use crate::error::XbitoResult;
use crate::models::{RawTask, Task, TaskList, TaskStatus};
use crate::pool::normalize_tasks;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Also return completed tasks finished at or after this instant
    pub include_completed_since: Option<DateTime<Utc>>,
}

pub trait TaskService {
    /// All task lists, every page
    fn fetch_all_task_lists(&mut self) -> XbitoResult<Vec<TaskList>>;

    /// All tasks of one list, every page
    fn fetch_tasks_for_list(&mut self, task_list_id: &str, opts: &FetchOptions) -> XbitoResult<Vec<RawTask>>;

    /// Fails with `RemoteUpdate`
    fn update_task_status(&mut self, task_list_id: &str, task_id: &str, status: TaskStatus) -> XbitoResult<()>;

    /// Fails with `RemoteUpdate`
    fn delete_task(&mut self, task_list_id: &str, task_id: &str) -> XbitoResult<()>;
}

/// Fetch every list and its tasks, normalized, in pool order
///
/// Any failing call fails the whole fetch so a refresh never installs a
/// partial pool.
pub fn fetch_everything<S>(service: &mut S, opts: &FetchOptions) -> XbitoResult<(Vec<TaskList>, Vec<Task>)>
where
    S: TaskService + ?Sized,
{
    let lists = service.fetch_all_task_lists()?;
    let mut tasks = Vec::new();
    for list in &lists {
        let raws = service.fetch_tasks_for_list(&list.id, opts)?;
        let normalized = normalize_tasks(&raws, list);
        log::debug!("Fetched {} tasks from list '{}'", normalized.len(), list.title);
        tasks.extend(normalized);
    }
    Ok((lists, tasks))
}
