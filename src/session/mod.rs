//! Session controller
//!
//! Owns the task pool and the presentation state of one viewing session:
//! the active filter or browsed list, the search text, the current rows and
//! the selection. UI events are expressed as method calls
//! (`on_filter_chosen`, `on_list_chosen`, `on_search_changed`,
//! `on_selection_changed`) and the remote round trips (refresh, complete,
//! delete) are serialized by a busy flag.

pub mod sync;

pub use sync::*;

use crate::error::{XbitoError, XbitoResult};
use crate::filter::{completed_since, filter_tasks, FilterContext, FilterSelection, DEFAULT_COMPLETED_WINDOW_DAYS};
use crate::models::{Task, TaskKey, TaskList, TaskStatus};
use crate::pool::TaskPool;
use crate::service::{fetch_everything, FetchOptions, TaskService};
use crate::view::{apply_search, present, render_rows, DetailsView, RowDisplay, ViewRow};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timezone: Tz,
    pub completed_window: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            completed_window: Duration::days(DEFAULT_COMPLETED_WINDOW_DAYS),
        }
    }
}

/// Proof that a refresh was started; hand it back with the fetch result
#[derive(Debug)]
pub struct RefreshTicket {
    reference: DateTime<Utc>,
    options: FetchOptions,
}

impl RefreshTicket {
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The remote call succeeded and the pool was updated
    Applied,
    /// The user declined the confirmation
    Cancelled,
    /// Another round trip was in flight; nothing happened
    Skipped,
}

pub struct Session {
    settings: SessionSettings,
    pool: TaskPool,
    filter: FilterSelection,
    browsed_list: Option<String>,
    search: String,
    reference: DateTime<Utc>,
    rows: Vec<ViewRow>,
    selection: SelectionSync,
    busy: bool,
}

impl Session {
    pub fn new(settings: SessionSettings, reference: DateTime<Utc>) -> Self {
        Self {
            settings,
            pool: TaskPool::new(),
            filter: FilterSelection::None,
            browsed_list: None,
            search: String::new(),
            reference,
            rows: Vec::new(),
            selection: SelectionSync::new(),
            busy: false,
        }
    }

    pub fn pool(&self) -> &TaskPool {
        &self.pool
    }

    pub fn lists(&self) -> &[TaskList] {
        self.pool.lists()
    }

    pub fn filter(&self) -> FilterSelection {
        self.filter
    }

    pub fn browsed_list(&self) -> Option<&str> {
        self.browsed_list.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// True while a remote round trip is in flight (show a busy indicator
    /// and disable the refresh control)
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn filter_context(&self) -> FilterContext {
        let mut ctx = FilterContext::new(self.reference, self.settings.timezone)
            .with_completed_window(self.settings.completed_window);
        ctx.task_list_id = self.browsed_list.clone();
        ctx
    }

    /// Filter engine output for the current view
    pub fn filtered(&self) -> Vec<&Task> {
        filter_tasks(&self.pool, self.filter, &self.filter_context())
    }

    fn rebuild_rows(&mut self) {
        let rows = {
            let ordered = self.filtered();
            present(&ordered, &self.search)
        };
        self.rows = rows;
    }

    /// Visible rows with their display columns read from the pool
    pub fn rendered_rows(&self) -> Vec<RowDisplay> {
        render_rows(&self.rows, &self.pool, &self.settings.timezone)
    }

    /// Details panel contents; `None` while the panel is hidden
    pub fn details(&self) -> Option<DetailsView> {
        self.selection.details(&self.pool, &self.settings.timezone)
    }

    /// Move the reference instant (e.g. at midnight) and re-run the filter
    pub fn set_reference(&mut self, reference: DateTime<Utc>) {
        self.reference = reference;
        self.rebuild_rows();
        self.selection.clear();
    }

    /// A named filter was chosen; this deselects any browsed list
    pub fn on_filter_chosen(&mut self, filter: FilterSelection) {
        self.filter = filter;
        if filter.is_named() {
            self.browsed_list = None;
        }
        self.rebuild_rows();
        self.selection.clear();
    }

    /// A task list was chosen in the sidebar; this clears the named filter
    pub fn on_list_chosen(&mut self, task_list_id: &str) {
        self.filter = FilterSelection::None;
        self.browsed_list = Some(task_list_id.to_string());
        self.rebuild_rows();
        self.selection.clear();
    }

    /// Search text changed: toggle row visibility, never reorder
    pub fn on_search_changed(&mut self, text: &str) {
        self.search = text.to_string();
        apply_search(&mut self.rows, &self.pool, &self.search);
    }

    pub fn on_selection_changed(&mut self, selected: &[TaskKey]) -> &SelectionState {
        self.selection.on_selection_changed(selected, &self.pool)
    }

    /// Start a full refresh. Returns `None` (and does nothing) when a
    /// refresh is already in flight.
    pub fn begin_refresh(&mut self, now: DateTime<Utc>) -> Option<RefreshTicket> {
        if self.busy {
            log::debug!("Refresh already in progress; ignoring trigger");
            return None;
        }
        self.busy = true;
        log::info!("Refreshing task pool");
        Some(RefreshTicket {
            reference: now,
            options: FetchOptions {
                include_completed_since: Some(completed_since(now, self.settings.completed_window)),
            },
        })
    }

    /// Apply the result of a refresh started with [`Session::begin_refresh`].
    /// On failure the pool stays at its last good state.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: XbitoResult<(Vec<TaskList>, Vec<Task>)>,
    ) -> XbitoResult<()> {
        self.busy = false;
        let (lists, tasks) = result.inspect_err(|e| log::warn!("Refresh failed: {}", e))?;

        self.pool.replace(lists, tasks);
        self.reference = ticket.reference;
        if self
            .browsed_list
            .as_deref()
            .is_some_and(|id| self.pool.list(id).is_none())
        {
            self.browsed_list = None;
        }
        self.rebuild_rows();
        self.selection.clear();
        log::info!(
            "Refreshed {} tasks in {} lists ({} shown)",
            self.pool.len(),
            self.pool.lists().len(),
            self.rows.iter().filter(|r| r.visible).count()
        );
        Ok(())
    }

    /// Full refresh through `service`. Returns `false` when skipped because
    /// another refresh is in flight.
    pub fn refresh<S>(&mut self, service: &mut S, now: DateTime<Utc>) -> XbitoResult<bool>
    where
        S: TaskService + ?Sized,
    {
        let Some(ticket) = self.begin_refresh(now) else {
            return Ok(false);
        };
        let result = fetch_everything(service, ticket.options());
        self.finish_refresh(ticket, result)?;
        Ok(true)
    }

    fn require_task(&self, key: &TaskKey) -> XbitoResult<&Task> {
        self.pool
            .get(key)
            .ok_or_else(|| XbitoError::TaskNotFound(key.clone()))
    }

    /// Re-run the filter after an in-place mutation; the selection survives
    /// only if its task is still shown.
    fn after_mutation(&mut self) {
        self.rebuild_rows();
        let rows = &self.rows;
        self.selection
            .retain_if(|key| rows.iter().any(|row| row.visible && &row.key == key));
    }

    /// Mark a task completed. On remote failure nothing changes locally and
    /// the error is returned for the user to see; there is no retry.
    pub fn mark_complete<S>(&mut self, service: &mut S, key: &TaskKey, now: DateTime<Utc>) -> XbitoResult<ActionOutcome>
    where
        S: TaskService + ?Sized,
    {
        if self.busy {
            log::debug!("Busy; ignoring complete request for {}", key);
            return Ok(ActionOutcome::Skipped);
        }
        self.require_task(key)?;

        self.busy = true;
        let result = service.update_task_status(&key.task_list_id, &key.task_id, TaskStatus::Completed);
        self.busy = false;
        if let Err(e) = result {
            log::warn!("Failed to complete task {}: {}", key, e);
            return Err(e);
        }

        self.pool.update(key, |task| task.mark_completed(now));
        self.after_mutation();
        log::info!("Completed task {}", key);
        Ok(ActionOutcome::Applied)
    }

    /// Delete a task after `confirm` approves it. On remote failure nothing
    /// changes locally.
    pub fn delete_task<S, C>(&mut self, service: &mut S, key: &TaskKey, confirm: C) -> XbitoResult<ActionOutcome>
    where
        S: TaskService + ?Sized,
        C: FnOnce(&Task) -> bool,
    {
        if self.busy {
            log::debug!("Busy; ignoring delete request for {}", key);
            return Ok(ActionOutcome::Skipped);
        }
        if !confirm(self.require_task(key)?) {
            return Ok(ActionOutcome::Cancelled);
        }

        self.busy = true;
        let result = service.delete_task(&key.task_list_id, &key.task_id);
        self.busy = false;
        if let Err(e) = result {
            log::warn!("Failed to delete task {}: {}", key, e);
            return Err(e);
        }

        self.pool.remove(key);
        self.after_mutation();
        log::info!("Deleted task {}", key);
        Ok(ActionOutcome::Applied)
    }

    /// Is the task currently shown as a visible row?
    pub fn is_visible(&self, key: &TaskKey) -> bool {
        self.rows.iter().any(|row| row.visible && &row.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::models::RawTask;

    /// Remote stand-in that records calls and can be told to fail
    #[derive(Default)]
    struct ScriptedService {
        fail: bool,
        updates: Vec<(String, String, TaskStatus)>,
        deletes: Vec<(String, String)>,
    }

    impl TaskService for ScriptedService {
        fn fetch_all_task_lists(&mut self) -> XbitoResult<Vec<TaskList>> {
            if self.fail {
                return Err(XbitoError::RemoteFetch("offline".into()));
            }
            Ok(vec![TaskList { id: "a".into(), title: "A".into() }])
        }

        fn fetch_tasks_for_list(&mut self, _task_list_id: &str, _opts: &FetchOptions) -> XbitoResult<Vec<RawTask>> {
            Ok(vec![RawTask {
                id: Some("9".into()),
                title: Some("Fetched".into()),
                updated: Some("2024-06-01T00:00:00.000Z".into()),
                ..Default::default()
            }])
        }

        fn update_task_status(&mut self, task_list_id: &str, task_id: &str, status: TaskStatus) -> XbitoResult<()> {
            if self.fail {
                return Err(XbitoError::RemoteUpdate("rejected".into()));
            }
            self.updates.push((task_list_id.into(), task_id.into(), status));
            Ok(())
        }

        fn delete_task(&mut self, task_list_id: &str, task_id: &str) -> XbitoResult<()> {
            if self.fail {
                return Err(XbitoError::RemoteUpdate("rejected".into()));
            }
            self.deletes.push((task_list_id.into(), task_id.into()));
            Ok(())
        }
    }

    fn session_with(tasks: Vec<Task>) -> Session {
        let mut session = Session::new(SessionSettings::default(), ts(2024, 6, 10, 12));
        let ticket = session.begin_refresh(ts(2024, 6, 10, 12)).unwrap();
        let lists = vec![
            TaskList { id: "a".into(), title: "A".into() },
            TaskList { id: "b".into(), title: "B".into() },
        ];
        session.finish_refresh(ticket, Ok((lists, tasks))).unwrap();
        session
    }

    #[test]
    fn test_filter_and_list_are_mutually_exclusive() {
        let mut session = session_with(vec![task("a", "1", "x"), task("b", "2", "y")]);
        session.on_list_chosen("b");
        assert_eq!(session.filter(), FilterSelection::None);
        assert_eq!(session.rows().len(), 1);

        session.on_filter_chosen(FilterSelection::All);
        assert_eq!(session.browsed_list(), None);
        assert_eq!(session.rows().len(), 2);

        session.on_list_chosen("a");
        assert_eq!(session.filter(), FilterSelection::None);
        assert_eq!(session.browsed_list(), Some("a"));
    }

    #[test]
    fn test_busy_flag_drops_second_refresh() {
        let mut session = Session::new(SessionSettings::default(), ts(2024, 6, 10, 12));
        let ticket = session.begin_refresh(ts(2024, 6, 10, 12)).unwrap();
        assert!(session.is_busy());
        assert!(session.begin_refresh(ts(2024, 6, 10, 12)).is_none());
        session.finish_refresh(ticket, Ok((vec![], vec![]))).unwrap();
        assert!(!session.is_busy());
        assert!(session.begin_refresh(ts(2024, 6, 10, 12)).is_some());
    }

    #[test]
    fn test_failed_refresh_keeps_last_good_pool() {
        let mut session = session_with(vec![task("a", "1", "x")]);
        let ticket = session.begin_refresh(ts(2024, 6, 11, 12)).unwrap();
        let err = session
            .finish_refresh(ticket, Err(XbitoError::RemoteFetch("offline".into())))
            .unwrap_err();
        assert!(matches!(err, XbitoError::RemoteFetch(_)));
        assert!(!session.is_busy());
        assert_eq!(session.pool().len(), 1);
        assert_eq!(session.reference(), ts(2024, 6, 10, 12));
    }

    #[test]
    fn test_refresh_clears_selection() {
        let mut session = session_with(vec![task("a", "1", "x")]);
        session.on_filter_chosen(FilterSelection::All);
        session.on_selection_changed(&[TaskKey::new("a", "1")]);
        assert!(session.details().is_some());

        let ticket = session.begin_refresh(ts(2024, 6, 10, 13)).unwrap();
        session
            .finish_refresh(ticket, Ok((vec![], vec![task("a", "1", "x")])))
            .unwrap();
        assert_eq!(session.selection(), &SelectionState::NoSelection);
        assert!(session.details().is_none());
    }

    #[test]
    fn test_refresh_without_selected_task_hides_details() {
        let mut session = session_with(vec![task("a", "1", "x"), task("a", "2", "y")]);
        session.on_filter_chosen(FilterSelection::All);
        let selected = TaskKey::new("a", "1");
        session.on_selection_changed(std::slice::from_ref(&selected));
        assert_eq!(session.selection(), &SelectionState::TaskSelected(selected.clone()));

        let ticket = session.begin_refresh(ts(2024, 6, 10, 13)).unwrap();
        session
            .finish_refresh(ticket, Ok((vec![], vec![task("a", "2", "y")])))
            .unwrap();
        assert!(session.pool().get(&selected).is_none());
        assert_eq!(session.selection(), &SelectionState::NoSelection);
        assert!(session.details().is_none());
    }

    #[test]
    fn test_huge_completed_window_does_not_overflow() {
        let settings = SessionSettings {
            timezone: chrono_tz::UTC,
            completed_window: Duration::milliseconds(i64::MAX),
        };
        let mut session = Session::new(settings, ts(2024, 6, 10, 12));
        let ticket = session.begin_refresh(ts(2024, 6, 10, 12)).unwrap();
        assert_eq!(ticket.options().include_completed_since, Some(DateTime::<Utc>::MIN_UTC));
        session
            .finish_refresh(ticket, Ok((vec![], vec![done(task("a", "1", "x"), Some(ts(2000, 1, 1, 0)))])))
            .unwrap();
        session.on_filter_chosen(FilterSelection::RecentlyCompleted);
        assert_eq!(session.rows().len(), 1);
    }

    #[test]
    fn test_search_toggles_visibility_only() {
        let mut session = session_with(vec![
            due(task("a", "1", "Buy milk"), ts(2024, 6, 12, 0)),
            due(task("a", "2", "Call mom"), ts(2024, 6, 11, 0)),
        ]);
        session.on_filter_chosen(FilterSelection::Next7Days);
        let order: Vec<String> = session.rows().iter().map(|r| r.key.task_id.clone()).collect();
        assert_eq!(order, vec!["2", "1"]);

        session.on_search_changed("MILK");
        let titles: Vec<String> = session.rendered_rows().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Buy milk"]);

        session.on_search_changed("");
        let order_after: Vec<String> = session.rows().iter().map(|r| r.key.task_id.clone()).collect();
        assert_eq!(order_after, order);
        assert!(session.rows().iter().all(|r| r.visible));
    }

    #[test]
    fn test_stale_browsed_list_is_dropped_on_refresh() {
        let mut session = session_with(vec![task("b", "1", "x")]);
        session.on_list_chosen("b");
        let ticket = session.begin_refresh(ts(2024, 6, 10, 13)).unwrap();
        session
            .finish_refresh(ticket, Ok((vec![TaskList { id: "a".into(), title: "A".into() }], vec![])))
            .unwrap();
        assert_eq!(session.browsed_list(), None);
        assert!(session.rows().is_empty());
    }

    #[test]
    fn test_refresh_through_service() {
        let mut session = Session::new(SessionSettings::default(), ts(2024, 6, 10, 12));
        let mut service = ScriptedService::default();
        assert!(session.refresh(&mut service, ts(2024, 6, 10, 12)).unwrap());
        assert_eq!(session.pool().len(), 1);
        assert_eq!(session.lists().len(), 1);

        service.fail = true;
        assert!(session.refresh(&mut service, ts(2024, 6, 10, 13)).is_err());
        assert_eq!(session.pool().len(), 1);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_mark_complete_moves_task_between_filters() {
        let mut session = session_with(vec![due(task("a", "1", "Pay rent"), ts(2024, 6, 10, 0))]);
        let key = TaskKey::new("a", "1");
        session.on_filter_chosen(FilterSelection::Today);
        session.on_selection_changed(&[key.clone()]);

        let mut service = ScriptedService::default();
        let outcome = session.mark_complete(&mut service, &key, ts(2024, 6, 10, 14)).unwrap();
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(service.updates, vec![("a".to_string(), "1".to_string(), TaskStatus::Completed)]);

        assert!(session.rows().is_empty());
        assert_eq!(session.selection(), &SelectionState::NoSelection);

        session.on_filter_chosen(FilterSelection::RecentlyCompleted);
        assert!(session.is_visible(&key));
        let task = session.pool().get(&key).unwrap();
        assert_eq!(task.completed, Some(ts(2024, 6, 10, 14)));
    }

    #[test]
    fn test_mark_complete_keeps_selection_when_still_shown() {
        let mut session = session_with(vec![task("a", "1", "x")]);
        let key = TaskKey::new("a", "1");
        session.on_filter_chosen(FilterSelection::All);
        session.on_selection_changed(&[key.clone()]);

        let mut service = ScriptedService::default();
        session.mark_complete(&mut service, &key, ts(2024, 6, 10, 14)).unwrap();
        assert_eq!(session.selection(), &SelectionState::TaskSelected(key.clone()));
        assert!(!session.details().unwrap().can_complete);
    }

    #[test]
    fn test_failed_mark_complete_changes_nothing() {
        let mut session = session_with(vec![due(task("a", "1", "Pay rent"), ts(2024, 6, 10, 0))]);
        let key = TaskKey::new("a", "1");
        session.on_filter_chosen(FilterSelection::Today);
        session.on_selection_changed(&[key.clone()]);

        let mut service = ScriptedService { fail: true, ..Default::default() };
        let err = session.mark_complete(&mut service, &key, ts(2024, 6, 10, 14)).unwrap_err();
        assert!(matches!(err, XbitoError::RemoteUpdate(_)));
        assert!(!session.pool().get(&key).unwrap().is_completed());
        assert!(session.is_visible(&key));
        assert_eq!(session.selection(), &SelectionState::TaskSelected(key));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_delete_respects_confirmation() {
        let mut session = session_with(vec![task("a", "1", "x"), task("a", "2", "y")]);
        let key = TaskKey::new("a", "1");
        session.on_filter_chosen(FilterSelection::All);
        let mut service = ScriptedService::default();

        let outcome = session.delete_task(&mut service, &key, |_| false).unwrap();
        assert_eq!(outcome, ActionOutcome::Cancelled);
        assert!(service.deletes.is_empty());
        assert_eq!(session.pool().len(), 2);

        let outcome = session.delete_task(&mut service, &key, |t| t.title == "x").unwrap();
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(service.deletes, vec![("a".to_string(), "1".to_string())]);
        assert!(session.pool().get(&key).is_none());
        assert_eq!(session.rows().len(), 1);
    }

    #[test]
    fn test_unknown_task_is_not_found() {
        let mut session = session_with(vec![]);
        let mut service = ScriptedService::default();
        let err = session
            .mark_complete(&mut service, &TaskKey::new("a", "404"), ts(2024, 6, 10, 14))
            .unwrap_err();
        assert!(matches!(err, XbitoError::TaskNotFound(_)));
    }
}
