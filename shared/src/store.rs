use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::model::{Priority, Task, TaskUpdate};

pub const DEFAULT_PRIORITY_COLOR: &str = "text-gray-500";

/// Display class for a priority label. Unrecognised labels get the default.
pub fn priority_color(priority: &str) -> &'static str {
    match priority.parse::<Priority>() {
        Ok(Priority::Low) => "text-green-500",
        Ok(Priority::Medium) => "text-yellow-500",
        Ok(Priority::High) => "text-red-500",
        Ok(Priority::Urgent) => "text-red-700",
        Err(_) => DEFAULT_PRIORITY_COLOR,
    }
}

/// Outcome of swapping a locally created task for the backend's record.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// The local task was deleted before the backend answered.
    Missing,
    Confirmed,
    /// Local edits made while the create was in flight, still to be sent.
    Diverged(TaskUpdate),
}

/// Owns the session's task list and the add-form input. Every mutation of
/// the list goes through here.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    input: String,
    loading: bool,
    load_started_at: Option<DateTime<Utc>>,
    deleted_during_load: HashSet<String>,
    /// Locally added ids awaiting the backend's record, flagged once edited.
    unconfirmed: HashMap<String, bool>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub fn begin_load(&mut self) {
        self.begin_load_at(Utc::now());
    }

    pub fn begin_load_at(&mut self, now: DateTime<Utc>) {
        self.loading = true;
        self.load_started_at = Some(now);
        self.deleted_during_load.clear();
    }

    /// Completes a load started with `begin_load`. Loading is cleared whatever
    /// the outcome; on failure the current list is kept.
    ///
    /// Fetched tasks are reconciled against edits made while the load was in
    /// flight: tasks deleted in the meantime stay deleted, a local copy with
    /// a newer `updated_at` wins, and tasks added since the load began are
    /// kept in front.
    pub fn finish_load(&mut self, result: Result<Vec<Task>, String>) {
        self.loading = false;
        let started = self.load_started_at.take();
        let deleted = std::mem::take(&mut self.deleted_during_load);

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching todos");
                return;
            }
        };

        let fetched_ids: HashSet<&str> = fetched.iter().map(|t| t.id.as_str()).collect();
        let mut merged: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| !fetched_ids.contains(t.id.as_str()))
            .filter(|t| started.is_some_and(|s| t.created_at >= s))
            .cloned()
            .collect();

        for task in fetched.iter() {
            if deleted.contains(&task.id) {
                tracing::debug!(id = %task.id, "dropping fetched task deleted during load");
                continue;
            }
            match self.find(&task.id) {
                Some(local) if local.updated_at > task.updated_at => {
                    tracing::debug!(id = %task.id, "keeping newer local copy");
                    merged.push(local.clone());
                }
                _ => merged.push(task.clone()),
            }
        }

        tracing::debug!(count = merged.len(), "tasks loaded");
        self.tasks = merged;
    }

    pub fn add(&mut self) -> Option<Task> {
        self.add_at(Utc::now())
    }

    /// Prepends a task titled with the trimmed input and clears the input.
    /// Blank input adds nothing.
    pub fn add_at(&mut self, now: DateTime<Utc>) -> Option<Task> {
        let title = self.input.trim();
        if title.is_empty() {
            return None;
        }

        let task = Task::new_at(title.to_string(), now);
        self.tasks.insert(0, task.clone());
        self.unconfirmed.insert(task.id.clone(), false);
        self.input.clear();
        Some(task)
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        self.toggle_at(id, Utc::now())
    }

    pub fn toggle_at(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.toggle_at(now);
                if let Some(edited) = self.unconfirmed.get_mut(id) {
                    *edited = true;
                }
                true
            }
            None => {
                tracing::debug!(id, "toggle ignored, no such task");
                false
            }
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            tracing::debug!(id, "delete ignored, no such task");
            return false;
        }
        if self.loading {
            self.deleted_during_load.insert(id.to_string());
        }
        true
    }

    /// True for a task added locally whose create the backend has not
    /// answered yet. Its id is unknown to the backend.
    pub fn is_unconfirmed(&self, id: &str) -> bool {
        self.unconfirmed.contains_key(id)
    }

    pub fn revert_toggle(&mut self, id: &str, stamp: DateTime<Utc>) -> bool {
        self.revert_toggle_at(id, stamp, Utc::now())
    }

    /// Undoes an optimistic toggle the backend rejected, provided the task
    /// has not changed since (`updated_at` still equals `stamp`).
    pub fn revert_toggle_at(&mut self, id: &str, stamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) if task.updated_at == stamp => {
                task.toggle_at(now);
                true
            }
            _ => {
                tracing::debug!(id, "toggle not reverted, task changed or gone");
                false
            }
        }
    }

    /// Swaps a locally created task for the record the backend stored.
    ///
    /// Toggles made on the local task in the meantime are carried onto the
    /// backend record and returned as an update to send. Any other entry
    /// already holding the backend id (a copy fetched by a concurrent load)
    /// is dropped so ids stay unique.
    pub fn confirm_created(&mut self, local_id: &str, task: Task) -> Confirmation {
        let edited = self.unconfirmed.remove(local_id).unwrap_or(false);
        let Some(pos) = self.tasks.iter().position(|t| t.id == local_id) else {
            return Confirmation::Missing;
        };

        let local = &self.tasks[pos];
        let mut confirmed = task;
        let mut outcome = Confirmation::Confirmed;
        if edited {
            if local.completed != confirmed.completed {
                confirmed.completed = local.completed;
                outcome = Confirmation::Diverged(TaskUpdate {
                    completed: Some(local.completed),
                    ..Default::default()
                });
            }
            confirmed.updated_at = confirmed.updated_at.max(local.updated_at);
        }

        let server_id = confirmed.id.clone();
        self.tasks[pos] = confirmed;
        let mut index = 0;
        self.tasks.retain(|t| {
            let keep = index == pos || t.id != server_id;
            index += 1;
            keep
        });
        outcome
    }

    /// Applies a backend copy of a task unless the local one is newer.
    pub fn apply_remote(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) if slot.updated_at <= task.updated_at => {
                *slot = task;
                true
            }
            _ => false,
        }
    }
}
