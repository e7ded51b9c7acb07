//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted to-do record and its category set.
//! - Validate title hygiene before anything reaches storage.
//!
//! # Invariants
//! - `id == UNASSIGNED_TASK_ID` only before the first insert.
//! - `title` is never blank after trimming.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Sentinel id for tasks that have not been inserted yet.
pub const UNASSIGNED_TASK_ID: TaskId = 0;

/// Closed set of task categories.
///
/// Persisted by enum name (`PERSONAL`, `WORK`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Personal,
    Work,
    Physical,
    Study,
    #[default]
    Other,
}

impl Category {
    /// All categories in picker order.
    pub const ALL: [Category; 5] = [
        Category::Personal,
        Category::Work,
        Category::Physical,
        Category::Study,
        Category::Other,
    ];

    /// Name stored in the `tasks.category` column.
    pub fn as_db_name(self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Work => "WORK",
            Self::Physical => "PHYSICAL",
            Self::Study => "STUDY",
            Self::Other => "OTHER",
        }
    }

    /// Parses a stored enum name. Matching is exact.
    pub fn from_db_name(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_db_name() == value)
    }

    /// String-resource key for the long label.
    pub fn display_key(self) -> &'static str {
        match self {
            Self::Personal => "cat_personal",
            Self::Work => "cat_work",
            Self::Physical => "cat_physical",
            Self::Study => "cat_study",
            Self::Other => "cat_other",
        }
    }

    /// String-resource key for the chip label.
    pub fn short_key(self) -> &'static str {
        match self {
            Self::Personal => "cat_personal_short",
            Self::Work => "cat_work_short",
            Self::Physical => "cat_physical_short",
            Self::Study => "cat_study_short",
            Self::Other => "cat_other_short",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_name())
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    NegativeId(TaskId),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::NegativeId(id) => write!(f, "task id must not be negative: {id}"),
        }
    }
}

impl Error for TaskValidationError {}

/// One entry of the to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub category: Category,
}

impl Task {
    /// Creates an unsaved, open task with a trimmed title.
    pub fn new(title: &str, category: Category) -> Self {
        Self {
            id: UNASSIGNED_TASK_ID,
            title: title.trim().to_string(),
            done: false,
            category,
        }
    }

    /// Returns whether the store still has to assign an id.
    pub fn is_unassigned(&self) -> bool {
        self.id == UNASSIGNED_TASK_ID
    }

    /// Returns a copy with `done` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            done: !self.done,
            ..self.clone()
        }
    }

    /// Checks record invariants before persistence and after load.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id < 0 {
            return Err(TaskValidationError::NegativeId(self.id));
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }
}
