//! In-memory task pool
//!
//! The pool holds every normalized task of the current session in pool
//! order (the order the remote returned them, list by list). It is owned by
//! the session controller and handed to the filter engine and the
//! presentation adapter by reference.

pub mod normalize;

pub use normalize::*;

use crate::models::{Task, TaskKey, TaskList};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct TaskPool {
    lists: Vec<TaskList>,
    tasks: IndexMap<TaskKey, Task>,
}

impl TaskPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from already-normalized records. A repeated key keeps
    /// its first position and the last record.
    pub fn from_parts(lists: Vec<TaskList>, tasks: Vec<Task>) -> Self {
        let mut pool = Self::new();
        pool.replace(lists, tasks);
        pool
    }

    /// Replace the whole pool (full refresh)
    pub fn replace(&mut self, lists: Vec<TaskList>, tasks: Vec<Task>) {
        self.lists = lists;
        self.tasks = tasks.into_iter().map(|t| (t.key(), t)).collect();
    }

    pub fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    pub fn list(&self, id: &str) -> Option<&TaskList> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// All tasks in pool order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn get(&self, key: &TaskKey) -> Option<&Task> {
        self.tasks.get(key)
    }

    pub fn contains(&self, key: &TaskKey) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Update a single record in place, keeping its pool position
    pub fn update<F>(&mut self, key: &TaskKey, f: F) -> bool
    where
        F: FnOnce(&mut Task),
    {
        match self.tasks.get_mut(key) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        }
    }

    /// Remove a single record, preserving the order of the rest
    pub fn remove(&mut self, key: &TaskKey) -> Option<Task> {
        self.tasks.shift_remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;

    fn sample() -> TaskPool {
        TaskPool::from_parts(
            vec![TaskList { id: "a".into(), title: "A".into() }],
            vec![task("a", "1", "one"), task("a", "2", "two"), task("a", "3", "three")],
        )
    }

    #[test]
    fn test_pool_order_is_insertion_order() {
        let pool = sample();
        let ids: Vec<&str> = pool.tasks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.list("a").map(|l| l.title.as_str()), Some("A"));
    }

    #[test]
    fn test_same_id_in_different_lists_is_distinct() {
        let pool = TaskPool::from_parts(vec![], vec![task("a", "1", "in a"), task("b", "1", "in b")]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(&TaskKey::new("b", "1")).map(|t| t.title.as_str()), Some("in b"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut pool = sample();
        let removed = pool.remove(&TaskKey::new("a", "2"));
        assert_eq!(removed.map(|t| t.title), Some("two".to_string()));
        let ids: Vec<&str> = pool.tasks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(pool.remove(&TaskKey::new("a", "2")).is_none());
    }

    #[test]
    fn test_update_in_place() {
        let mut pool = sample();
        assert!(pool.update(&TaskKey::new("a", "2"), |t| t.title = "TWO".into()));
        assert!(!pool.update(&TaskKey::new("a", "9"), |t| t.title = "nope".into()));
        let titles: Vec<&str> = pool.tasks().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "TWO", "three"]);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut pool = sample();
        pool.replace(vec![], vec![task("b", "9", "nine")]);
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains(&TaskKey::new("a", "1")));
        assert!(pool.lists().is_empty());
    }
}
