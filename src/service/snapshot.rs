//! JSON snapshot task service
//!
//! Serves task lists and tasks from a JSON document shaped like the remote
//! API responses and writes mutations back to it:
//!
//! ```json
//! {
//!   "taskLists": [{ "id": "L1", "title": "Groceries" }],
//!   "tasks": { "L1": [{ "id": "t1", "title": "Buy milk", "updated": "2024-06-01T10:00:00.000Z" }] }
//! }
//! ```

use crate::error::{XbitoError, XbitoResult};
use crate::models::{RawTask, RawTaskList, TaskList, TaskStatus};
use crate::pool::normalize_task_lists;
use crate::service::{FetchOptions, TaskService};
use crate::utils::{parse_remote_timestamp, to_remote_timestamp};
use anyhow::{Context, Result};
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub task_lists: Vec<RawTaskList>,
    #[serde(default)]
    pub tasks: IndexMap<String, Vec<RawTask>>,
}

pub struct SnapshotService {
    path: Option<PathBuf>,
    snapshot: Snapshot,
}

impl SnapshotService {
    /// Load a snapshot file; mutations are written back to it
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task snapshot: {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse task snapshot: {}", path.display()))?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            snapshot,
        })
    }

    /// Serve an in-memory snapshot (nothing is persisted)
    pub fn in_memory(snapshot: Snapshot) -> Self {
        Self { path: None, snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn save(&self) -> XbitoResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.snapshot)
            .map_err(|e| XbitoError::RemoteUpdate(format!("failed to encode snapshot: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| XbitoError::RemoteUpdate(format!("failed to write {}: {}", path.display(), e)))
    }

    fn find_task_mut(&mut self, task_list_id: &str, task_id: &str) -> XbitoResult<&mut RawTask> {
        self.snapshot
            .tasks
            .get_mut(task_list_id)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id.as_deref() == Some(task_id)))
            .ok_or_else(|| {
                XbitoError::RemoteUpdate(format!("task {} not found in list {}", task_id, task_list_id))
            })
    }
}

fn completed_before(task: &RawTask, since: chrono::DateTime<Utc>) -> bool {
    if task.status.as_deref() != Some("completed") {
        return false;
    }
    match task.completed.as_deref().map(parse_remote_timestamp) {
        Some(Ok(completed)) => completed < since,
        // Unknown completion time cannot be shown as recent
        _ => true,
    }
}

impl TaskService for SnapshotService {
    fn fetch_all_task_lists(&mut self) -> XbitoResult<Vec<TaskList>> {
        Ok(normalize_task_lists(&self.snapshot.task_lists))
    }

    fn fetch_tasks_for_list(&mut self, task_list_id: &str, opts: &FetchOptions) -> XbitoResult<Vec<RawTask>> {
        if !self
            .snapshot
            .task_lists
            .iter()
            .any(|l| l.id.as_deref() == Some(task_list_id))
        {
            return Err(XbitoError::RemoteFetch(format!("unknown task list {}", task_list_id)));
        }
        let tasks = self.snapshot.tasks.get(task_list_id).cloned().unwrap_or_default();
        Ok(match opts.include_completed_since {
            Some(since) => tasks.into_iter().filter(|t| !completed_before(t, since)).collect(),
            None => tasks,
        })
    }

    fn update_task_status(&mut self, task_list_id: &str, task_id: &str, status: TaskStatus) -> XbitoResult<()> {
        let now = to_remote_timestamp(Utc::now());
        let task = self.find_task_mut(task_list_id, task_id)?;
        task.status = Some(status.as_str().to_string());
        task.completed = match status {
            TaskStatus::Completed => Some(now.clone()),
            TaskStatus::NeedsAction => None,
        };
        task.updated = Some(now);
        self.save()
    }

    fn delete_task(&mut self, task_list_id: &str, task_id: &str) -> XbitoResult<()> {
        let tasks = self.snapshot.tasks.get_mut(task_list_id).ok_or_else(|| {
            XbitoError::RemoteUpdate(format!("task list {} not found", task_list_id))
        })?;
        let before = tasks.len();
        tasks.retain(|t| t.id.as_deref() != Some(task_id));
        if tasks.len() == before {
            return Err(XbitoError::RemoteUpdate(format!(
                "task {} not found in list {}",
                task_id, task_list_id
            )));
        }
        self.save()
    }
}
