//! Task list use-case service.
//!
//! # Responsibility
//! - Be the only consumer-facing task API: add, toggle, delete, undo, filter.
//! - Hold the single pending-undo slot for the last deleted task.
//!
//! # Invariants
//! - Blank titles and unknown ids are absorbed here as silent no-ops.
//! - Filtering never touches the store.
//! - At most one deleted task is restorable; a newer delete supersedes it.
//!
//! # Known limitations
//! - `toggle` is read-then-write over the latest snapshot; two toggles of the
//!   same id issued before either lands may both flip from the same state.
//! - `undo_delete` restores by `(title, category)` match, not identity. With
//!   duplicate pairs the newest match is toggled, which may be the wrong row.

use crate::model::task::{Category, Task, TaskId};
use crate::store::task_store::{
    MutationHandle, StoreResult, TaskListSubscription, TaskSnapshot, TaskStore,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Number of open tasks shown on the day task list.
pub const FOCUS_QUEUE_LEN: usize = 6;

/// Sample tasks of a fresh installation, one pass through every category.
pub const SAMPLE_TASKS: [(&str, Category); 10] = [
    ("Morgen-Jogging (30 min)", Category::Physical),
    ("E-Mails sortieren", Category::Work),
    ("Einkaufen für die Woche", Category::Personal),
    ("Kapitel 4 lernen", Category::Study),
    ("Rechnung überweisen", Category::Other),
    ("Yoga Session", Category::Physical),
    ("Meeting Protokoll schreiben", Category::Work),
    ("Mama anrufen", Category::Personal),
    ("Vokabeln wiederholen", Category::Study),
    ("Pflanzen gießen", Category::Other),
];

/// List filter selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskFilter {
    #[default]
    All,
    Open,
    Done,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Open => !task.done,
            Self::Done => task.done,
        }
    }
}

/// Projects a snapshot through a filter, keeping snapshot order.
pub fn apply_filter(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

/// Returns whether the day task list has been worked off.
///
/// An empty list does not count as cleared.
pub fn is_day_list_cleared(tasks: &[Task]) -> bool {
    !tasks.is_empty() && tasks.iter().all(|task| task.done)
}

/// Task list engine over a `TaskStore`.
pub struct TaskListService {
    store: TaskStore,
    filter: TaskFilter,
    pending_undo: Option<Task>,
}

impl TaskListService {
    /// Creates the engine with filter `All` and an empty undo slot.
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            filter: TaskFilter::All,
            pending_undo: None,
        }
    }

    /// Live list mirrored from the store.
    pub fn tasks(&self) -> TaskListSubscription {
        self.store.observe_all()
    }

    /// Latest snapshot, unfiltered.
    pub fn snapshot(&self) -> TaskSnapshot {
        self.store.snapshot()
    }

    /// Adds an open task.
    ///
    /// Returns `None` without touching the store when `title` is blank after
    /// trimming.
    pub fn add(&self, title: &str, category: Category) -> Option<MutationHandle<TaskId>> {
        let title = title.trim();
        if title.is_empty() {
            debug!("event=task_add module=service status=skipped reason=blank_title");
            return None;
        }

        debug!(
            "event=task_add module=service status=submitted category={}",
            category
        );
        Some(self.store.insert(Task::new(title, category)))
    }

    /// Flips `done` of the task with `id` in the latest snapshot.
    ///
    /// Returns `None` when the id is not in the snapshot.
    pub fn toggle(&self, id: TaskId) -> Option<MutationHandle<()>> {
        let snapshot = self.store.snapshot();
        let Some(task) = snapshot.iter().find(|task| task.id == id) else {
            debug!("event=task_toggle module=service status=skipped reason=not_found id={id}");
            return None;
        };

        debug!(
            "event=task_toggle module=service status=submitted id={} done={}",
            id, !task.done
        );
        Some(self.store.update(task.toggled()))
    }

    /// Deletes the task and keeps it in the undo slot.
    ///
    /// Returns `None` and leaves the undo slot alone when the id is not in the
    /// latest snapshot.
    pub fn delete(&mut self, id: TaskId) -> Option<MutationHandle<()>> {
        let removed = self
            .store
            .snapshot()
            .iter()
            .find(|task| task.id == id)
            .cloned();
        let Some(removed) = removed else {
            debug!("event=task_delete module=service status=skipped reason=not_found id={id}");
            return None;
        };

        let handle = self.store.delete_by_id(id);
        if self.pending_undo.replace(removed).is_some() {
            debug!("event=task_undo module=service status=superseded");
        }
        debug!("event=task_delete module=service status=submitted id={id}");
        Some(handle)
    }

    /// Task that `undo_delete` would restore.
    pub fn pending_undo(&self) -> Option<&Task> {
        self.pending_undo.as_ref()
    }

    /// Closes the undo window without restoring.
    pub fn dismiss_undo(&mut self) {
        self.pending_undo = None;
    }

    /// Restores the last deleted task, consuming the undo slot.
    ///
    /// The task is re-added with a new id. If it was done, the newest task
    /// matching `(title, category)` is toggled once the insert has landed.
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn undo_delete(&mut self) -> StoreResult<bool> {
        let Some(removed) = self.pending_undo.take() else {
            return Ok(false);
        };
        let Some(insert) = self.add(&removed.title, removed.category) else {
            return Ok(false);
        };
        insert.wait().await?;

        if removed.done {
            let newest_match = self
                .store
                .snapshot()
                .iter()
                .find(|task| task.title == removed.title && task.category == removed.category)
                .map(|task| task.id);
            if let Some(toggle) = newest_match.and_then(|id| self.toggle(id)) {
                toggle.wait().await?;
            }
        }

        info!(
            "event=task_undo module=service status=ok category={} done={}",
            removed.category, removed.done
        );
        Ok(true)
    }

    /// Currently selected filter.
    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Latest snapshot projected through the current filter.
    pub fn visible_tasks(&self) -> Vec<Task> {
        apply_filter(&self.store.snapshot(), self.filter)
    }

    /// Open tasks for the day task list, newest first; only the first one is
    /// meant to be checkable.
    pub fn focus_queue(&self) -> Vec<Task> {
        self.store
            .snapshot()
            .iter()
            .filter(|task| !task.done)
            .take(FOCUS_QUEUE_LEN)
            .cloned()
            .collect()
    }

    /// Wipes the list and inserts `SAMPLE_TASKS` in order.
    ///
    /// Clears the undo slot.
    pub async fn replace_with_sample_tasks(&mut self) -> StoreResult<()> {
        let existing = self.store.snapshot();
        let deletes: Vec<MutationHandle<()>> = existing
            .iter()
            .map(|task| self.store.delete_by_id(task.id))
            .collect();
        let inserts: Vec<MutationHandle<TaskId>> = SAMPLE_TASKS
            .iter()
            .map(|(title, category)| self.store.insert(Task::new(title, *category)))
            .collect();

        for handle in deletes {
            handle.wait().await?;
        }
        for handle in inserts {
            handle.wait().await?;
        }
        self.pending_undo = None;

        info!(
            "event=task_seed module=service status=ok removed={} inserted={}",
            existing.len(),
            SAMPLE_TASKS.len()
        );
        Ok(())
    }
}
