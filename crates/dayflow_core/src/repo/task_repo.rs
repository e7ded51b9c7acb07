//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Inserts with an explicit id replace any existing row with that id.
//! - Update/delete of a missing id report `false`, never an error.
//! - Listing order is `id DESC` (newest first).

use crate::db::DbError;
use crate::model::task::{Category, Task, TaskId, TaskValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT id, title, done, category FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Inserts a task and returns its id.
    ///
    /// An unassigned id gets a fresh one; an explicit id replaces on conflict.
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Fully replaces the row with `task.id`. Returns whether a row matched.
    fn update_task(&self, task: &Task) -> RepoResult<bool>;
    /// Deletes by id. Returns whether a row was removed.
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    /// Lists all tasks, newest first.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        if task.is_unassigned() {
            self.conn.execute(
                "INSERT INTO tasks (title, done, category) VALUES (?1, ?2, ?3);",
                params![
                    task.title.trim(),
                    bool_to_int(task.done),
                    task.category.as_db_name(),
                ],
            )?;
            return Ok(self.conn.last_insert_rowid());
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO tasks (id, title, done, category)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task.id,
                task.title.trim(),
                bool_to_int(task.done),
                task.category.as_db_name(),
            ],
        )?;
        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<bool> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                done = ?2,
                category = ?3
             WHERE id = ?4;",
            params![
                task.title.trim(),
                bool_to_int(task.done),
                task.category.as_db_name(),
                task.id,
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let category_text: String = row.get("category")?;
    let category = Category::from_db_name(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in tasks.category (id={id})"
        ))
    })?;

    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done (id={id})"
            )));
        }
    };

    let task = Task {
        id,
        title: row.get("title")?,
        done,
        category,
    };
    task.validate()?;
    Ok(task)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
