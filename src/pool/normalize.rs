//! Task record normalizer
//!
//! Maps raw remote records plus their owning list into canonical [`Task`]s.
//! Records without identity are rejected with `MalformedRecord`; the batch
//! helpers drop them with a logged warning.

use crate::error::{XbitoError, XbitoResult};
use crate::models::{RawTask, RawTaskList, Task, TaskList, TaskStatus, DEFAULT_PRIORITY};
use crate::utils::parse_remote_timestamp;
use chrono::{DateTime, Utc};

fn required<'a>(value: &'a Option<String>, field: &'static str) -> XbitoResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(XbitoError::malformed(field, "is empty")),
        None => Err(XbitoError::malformed(field, "is missing")),
    }
}

fn timestamp(value: &Option<String>, field: &'static str) -> XbitoResult<Option<DateTime<Utc>>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_remote_timestamp(v)
            .map(Some)
            .map_err(|e| XbitoError::malformed(field, e.to_string())),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

pub fn normalize_task_list(raw: &RawTaskList) -> XbitoResult<TaskList> {
    let id = required(&raw.id, "taskList.id")?;
    let title = raw.title.clone().ok_or_else(|| XbitoError::malformed("taskList.title", "is missing"))?;
    Ok(TaskList {
        id: id.to_string(),
        title,
    })
}

/// Normalize one remote task belonging to `list`
pub fn normalize_task(raw: &RawTask, list: &TaskList) -> XbitoResult<Task> {
    let id = required(&raw.id, "id")?;
    // An empty title is a legitimate remote value; only a missing one is not
    let title = raw.title.clone().ok_or_else(|| XbitoError::malformed("title", "is missing"))?;
    let updated = timestamp(&raw.updated, "updated")?
        .ok_or_else(|| XbitoError::malformed("updated", "is missing"))?;

    Ok(Task {
        id: id.to_string(),
        task_list_id: list.id.clone(),
        task_list_name: list.title.clone(),
        title,
        updated,
        due: timestamp(&raw.due, "due")?,
        completed: timestamp(&raw.completed, "completed")?,
        status: raw
            .status
            .as_deref()
            .map(TaskStatus::from_remote)
            .unwrap_or(TaskStatus::NeedsAction),
        notes: non_empty(&raw.notes),
        web_view_link: non_empty(&raw.web_view_link),
        priority: non_empty(&raw.priority).unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
    })
}

/// Normalize a page of remote tasks, dropping malformed records
pub fn normalize_tasks(raws: &[RawTask], list: &TaskList) -> Vec<Task> {
    raws.iter()
        .filter_map(|raw| match normalize_task(raw, list) {
            Ok(task) => Some(task),
            Err(e) => {
                log::warn!(
                    "Dropping task {} in list '{}': {}",
                    raw.id.as_deref().unwrap_or("<no id>"),
                    list.title,
                    e
                );
                None
            }
        })
        .collect()
}

/// Normalize remote task lists, dropping malformed records
pub fn normalize_task_lists(raws: &[RawTaskList]) -> Vec<TaskList> {
    raws.iter()
        .filter_map(|raw| match normalize_task_list(raw) {
            Ok(list) => Some(list),
            Err(e) => {
                log::warn!("Dropping task list {}: {}", raw.id.as_deref().unwrap_or("<no id>"), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn list() -> TaskList {
        TaskList {
            id: "L1".to_string(),
            title: "Groceries".to_string(),
        }
    }

    fn raw(id: Option<&str>, title: Option<&str>) -> RawTask {
        RawTask {
            id: id.map(str::to_string),
            title: title.map(str::to_string),
            updated: Some("2024-06-01T10:00:00.000Z".to_string()),
            status: Some("needsAction".to_string()),
            ..RawTask::default()
        }
    }

    #[test]
    fn test_normalize_full_record() {
        let mut r = raw(Some("t1"), Some("Buy milk"));
        r.due = Some("2024-06-10T00:00:00.000Z".to_string());
        r.notes = Some("2%".to_string());
        r.web_view_link = Some("https://tasks.google.com/t1".to_string());
        r.priority = Some("High".to_string());

        let task = normalize_task(&r, &list()).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.task_list_id, "L1");
        assert_eq!(task.task_list_name, "Groceries");
        assert_eq!(task.due, Some(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()));
        assert_eq!(task.status, TaskStatus::NeedsAction);
        assert_eq!(task.notes.as_deref(), Some("2%"));
        assert_eq!(task.priority, "High");
    }

    #[test]
    fn test_missing_optional_fields_are_absent() {
        let mut r = raw(Some("t1"), Some("Buy milk"));
        r.due = Some(String::new());
        r.web_view_link = Some(String::new());
        let task = normalize_task(&r, &list()).unwrap();
        assert!(task.due.is_none());
        assert!(task.completed.is_none());
        assert!(task.notes.is_none());
        assert!(task.web_view_link.is_none());
        assert_eq!(task.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_status_mapping() {
        let mut r = raw(Some("t1"), Some("x"));
        r.status = Some("completed".to_string());
        r.completed = Some("2024-06-09T08:00:00.000Z".to_string());
        let task = normalize_task(&r, &list()).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed.is_some());

        r.status = None;
        assert_eq!(normalize_task(&r, &list()).unwrap().status, TaskStatus::NeedsAction);
    }

    #[test]
    fn test_missing_identity_is_malformed() {
        let err = normalize_task(&raw(None, Some("x")), &list()).unwrap_err();
        assert!(matches!(err, XbitoError::MalformedRecord { field: "id", .. }));

        let err = normalize_task(&raw(Some("t1"), None), &list()).unwrap_err();
        assert!(matches!(err, XbitoError::MalformedRecord { field: "title", .. }));

        let err = normalize_task(&raw(Some("  "), Some("x")), &list()).unwrap_err();
        assert!(matches!(err, XbitoError::MalformedRecord { field: "id", .. }));
    }

    #[test]
    fn test_unparseable_timestamp_is_malformed() {
        let mut r = raw(Some("t1"), Some("x"));
        r.due = Some("next tuesday".to_string());
        let err = normalize_task(&r, &list()).unwrap_err();
        assert!(matches!(err, XbitoError::MalformedRecord { field: "due", .. }));
    }

    #[test]
    fn test_batch_drops_malformed_records() {
        let raws = vec![
            raw(Some("t1"), Some("Keep")),
            raw(None, Some("No id")),
            raw(Some("t3"), None),
            raw(Some("t4"), Some("Keep too")),
        ];
        let tasks = normalize_tasks(&raws, &list());
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t4"]);
    }

    #[test]
    fn test_normalize_task_lists() {
        let raws = vec![
            RawTaskList { id: Some("L1".into()), title: Some("Home".into()) },
            RawTaskList { id: None, title: Some("Broken".into()) },
        ];
        let lists = normalize_task_lists(&raws);
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].title, "Home");
    }
}
