use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default priority when the remote record carries none
pub const DEFAULT_PRIORITY: &str = "None";

/// Task status as reported by the remote task API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    NeedsAction,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NeedsAction => "needsAction",
            TaskStatus::Completed => "completed",
        }
    }

    /// Map a remote status string. Only `"completed"` is terminal;
    /// anything else (including unknown values) is still actionable.
    pub fn from_remote(s: &str) -> Self {
        if s == "completed" {
            TaskStatus::Completed
        } else {
            TaskStatus::NeedsAction
        }
    }
}

/// A task list (container of tasks). Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub title: String,
}

/// Identity of a task inside the pool.
///
/// Task ids are only unique within their owning list, so the list id is
/// part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub task_list_id: String,
    pub task_id: String,
}

impl TaskKey {
    pub fn new(task_list_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            task_list_id: task_list_id.into(),
            task_id: task_id.into(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.task_list_id, self.task_id)
    }
}

/// Canonical task record (after normalization)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task_list_id: String,
    pub task_list_name: String,
    pub title: String,
    pub updated: DateTime<Utc>,
    pub due: Option<DateTime<Utc>>,
    pub completed: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub web_view_link: Option<String>,
    pub priority: String,
}

impl Task {
    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.task_list_id.clone(), self.id.clone())
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// The single date shown for this task: the completion time when the
    /// task is completed, otherwise the due date.
    pub fn active_date(&self) -> Option<DateTime<Utc>> {
        if self.is_completed() {
            self.completed
        } else {
            self.due
        }
    }

    /// Calendar day the task is due. The remote API stores due dates as
    /// midnight UTC with the time portion discarded, so the UTC date is the
    /// date the user picked.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.map(|d| d.date_naive())
    }

    pub fn active_date_label(&self) -> &'static str {
        if self.is_completed() {
            "Completed"
        } else {
            "Due"
        }
    }

    /// Apply a successful remote completion to the local record
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed = Some(at);
        self.updated = at;
    }
}
