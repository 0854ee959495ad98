use chrono::Utc;

use crate::io::recovery;
use crate::io::store::{KeyValueStore, StoreError};
use crate::io::todo_io;
use crate::model::task::{Priority, Task};
use crate::ops::notice::{NoticeKind, Notifier, cleared_message};
use crate::ops::stats::{Stats, stats};
use crate::ops::task_ops;
use crate::ops::view::{StatusFilter, visible};

/// Runs one user intent end to end: pure transition, write-through save,
/// then a notice.
///
/// Save failures never abort an intent. The in-memory collection keeps the
/// change, the store has already logged the payload to the recovery log, and
/// the error is parked for the caller to pick up with [`take_save_error`].
/// Until a later save succeeds, [`reload`] leaves the unsaved collection alone.
///
/// [`take_save_error`]: Controller::take_save_error
/// [`reload`]: Controller::reload
pub struct Controller<S: KeyValueStore, N: Notifier> {
    tasks: Vec<Task>,
    store: S,
    notifier: N,
    save_error: Option<StoreError>,
    /// The in-memory collection is ahead of the store
    unsaved: bool,
}

impl<S: KeyValueStore, N: Notifier> Controller<S, N> {
    /// Load the collection from `store`.
    pub fn load(store: S, notifier: N) -> Self {
        let tasks = todo_io::load(&store);
        Controller {
            tasks,
            store,
            notifier,
            save_error: None,
            unsaved: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn take_save_error(&mut self) -> Option<StoreError> {
        self.save_error.take()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Re-read the store (after another process wrote it).
    /// Returns true if the collection changed. Skipped while a failed save
    /// left changes that exist only in memory.
    pub fn reload(&mut self) -> bool {
        if self.unsaved {
            return false;
        }
        let fresh = todo_io::load(&self.store);
        if fresh == self.tasks {
            return false;
        }
        self.tasks = fresh;
        true
    }

    pub fn visible(&self, filter: StatusFilter, search: &str) -> Vec<&Task> {
        visible(&self.tasks, filter, search)
    }

    pub fn stats(&self) -> Stats {
        stats(&self.tasks)
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    pub fn add(
        &mut self,
        text: &str,
        priority: Option<Priority>,
        due_date: Option<String>,
    ) -> Option<Task> {
        let now = Utc::now().timestamp_millis();
        match task_ops::add(&self.tasks, text, priority, due_date, now) {
            Some((next, created)) => {
                self.commit(next);
                self.notifier.notify(
                    NoticeKind::Info,
                    "Task added",
                    "Your new task has been added successfully.",
                );
                Some(created)
            }
            None => {
                self.notifier.notify(
                    NoticeKind::Error,
                    "Empty task",
                    "Please enter a task before adding.",
                );
                None
            }
        }
    }

    /// Flip completion. Returns the new state, or `None` if the ID is unknown.
    /// Only completing a task is celebrated.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let completed = task_ops::toggle_transition(&self.tasks, id)?;
        let next = task_ops::toggle(&self.tasks, id);
        self.commit(next);
        if completed {
            self.notifier.notify(
                NoticeKind::Info,
                "Task completed!",
                "Nice work, keep it up! 🎉",
            );
        }
        Some(completed)
    }

    /// Returns true if the text changed.
    pub fn edit(&mut self, id: &str, new_text: &str) -> bool {
        if task_ops::find_task(&self.tasks, id).is_none() {
            return false;
        }
        if new_text.trim().is_empty() {
            self.notifier.notify(
                NoticeKind::Error,
                "Empty task",
                "Task text cannot be empty.",
            );
            return false;
        }
        let next = task_ops::edit(&self.tasks, id, new_text);
        if !self.commit(next) {
            return false;
        }
        self.notifier.notify(
            NoticeKind::Info,
            "Task updated",
            "Your changes have been saved.",
        );
        true
    }

    /// Returns the removed task, if any.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let removed = task_ops::find_task(&self.tasks, id)?.clone();
        let next = task_ops::delete(&self.tasks, id);
        self.commit(next);
        if let Some(dir) = self.store.recovery_dir()
            && let Ok(json) = serde_json::to_string(&removed)
        {
            recovery::log_task_deletion(dir, &removed.id, &json);
        }
        self.notifier.notify(
            NoticeKind::Info,
            "Task deleted",
            "The task has been removed.",
        );
        Some(removed)
    }

    /// Returns the number of tasks removed.
    pub fn clear_completed(&mut self) -> usize {
        let (next, removed) = task_ops::clear_completed(&self.tasks);
        if removed == 0 {
            self.notifier.notify(
                NoticeKind::Info,
                "Nothing to clear",
                "There are no completed tasks.",
            );
            return 0;
        }
        self.commit(next);
        self.notifier.notify(
            NoticeKind::Info,
            "Completed tasks cleared",
            &cleared_message(removed),
        );
        removed
    }

    /// Returns true if the priority changed.
    pub fn set_priority(&mut self, id: &str, priority: Option<Priority>) -> bool {
        let next = task_ops::set_priority(&self.tasks, id, priority);
        self.commit(next)
    }

    /// Returns true if the due date changed.
    pub fn set_due_date(&mut self, id: &str, due_date: Option<String>) -> bool {
        let next = task_ops::set_due_date(&self.tasks, id, due_date);
        self.commit(next)
    }

    /// Replace the collection and write it through. No-op when unchanged.
    fn commit(&mut self, next: Vec<Task>) -> bool {
        if next == self.tasks {
            return false;
        }
        self.tasks = next;
        match todo_io::save(&mut self.store, &self.tasks) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                self.unsaved = true;
                self.save_error = Some(e);
            }
        }
        true
    }
}
