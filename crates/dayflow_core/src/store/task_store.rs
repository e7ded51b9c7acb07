//! Single-writer task store.
//!
//! # Responsibility
//! - Own the SQLite connection used for task writes.
//! - Expose `observe_all` (live list) plus insert/update/delete.
//!
//! # Invariants
//! - The writer thread is the only code touching the `tasks` table through
//!   this store; writes are FIFO.
//! - Snapshots are ordered `id DESC` and shared as `Arc<Vec<Task>>`.
//! - Failed mutations do not publish a snapshot.
//! - A committed write resolves `Ok` even when the follow-up re-read fails;
//!   observers then keep the previous snapshot until a later write refreshes.
//! - Update/delete of a missing id succeed as no-ops.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, SqliteTaskRepository, TaskRepository};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};

const WRITER_THREAD_NAME: &str = "dayflow-task-store";

/// Immutable list published to observers.
pub type TaskSnapshot = Arc<Vec<Task>>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by task-store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Persistence failure inside the writer.
    Repo(RepoError),
    /// Writer thread could not be started.
    Spawn(String),
    /// Writer thread is gone; the mutation was not applied.
    Closed,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Spawn(message) => write!(f, "failed to start task store writer: {message}"),
            Self::Closed => write!(f, "task store is closed"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Spawn(_) | Self::Closed => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

type Reply<T> = oneshot::Sender<StoreResult<T>>;

enum StoreCommand {
    Insert(Task, Reply<TaskId>),
    Update(Task, Reply<()>),
    Delete(TaskId, Reply<()>),
}

impl StoreCommand {
    fn op_name(&self) -> &'static str {
        match self {
            Self::Insert(..) => "insert",
            Self::Update(..) => "update",
            Self::Delete(..) => "delete",
        }
    }
}

/// Pending outcome of a submitted mutation.
///
/// Dropping the handle does not cancel the mutation.
#[must_use = "drop the handle explicitly for fire-and-forget mutations"]
pub struct MutationHandle<T> {
    reply: oneshot::Receiver<StoreResult<T>>,
}

impl<T> MutationHandle<T> {
    /// Waits until the writer applied the mutation and published a snapshot.
    pub async fn wait(self) -> StoreResult<T> {
        match self.reply.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Closed),
        }
    }
}

/// Live view over the task list.
///
/// The first `next()` replays the latest snapshot; later calls wait for the
/// next published one. Intermediate snapshots may be skipped.
pub struct TaskListSubscription {
    snapshots: watch::Receiver<TaskSnapshot>,
    replayed: bool,
}

impl TaskListSubscription {
    /// Latest published snapshot, without waiting.
    pub fn current(&self) -> TaskSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Returns the next snapshot, or `None` once the store is gone.
    pub async fn next(&mut self) -> Option<TaskSnapshot> {
        if !self.replayed {
            self.replayed = true;
            return Some(self.snapshots.borrow_and_update().clone());
        }
        self.snapshots.changed().await.ok()?;
        Some(self.snapshots.borrow_and_update().clone())
    }
}

/// Cloneable handle to the task store writer.
#[derive(Clone)]
pub struct TaskStore {
    commands: mpsc::UnboundedSender<StoreCommand>,
    snapshots: watch::Receiver<TaskSnapshot>,
}

impl TaskStore {
    /// Loads the current list and starts the writer thread.
    ///
    /// The writer stops once every `TaskStore` clone is dropped.
    ///
    /// # Errors
    /// - `StoreError::Repo` when the initial list cannot be loaded, including
    ///   rows with unknown categories.
    /// - `StoreError::Spawn` when the writer thread cannot be created.
    pub fn spawn(conn: Connection) -> StoreResult<Self> {
        let initial = SqliteTaskRepository::new(&conn).list_tasks()?;
        let initial_count = initial.len();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(initial));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(conn, command_rx, snapshot_tx))
            .map_err(|err| StoreError::Spawn(err.to_string()))?;

        info!(
            "event=task_store_start module=store status=ok task_count={}",
            initial_count
        );

        Ok(Self {
            commands: command_tx,
            snapshots: snapshot_rx,
        })
    }

    /// Subscribes to the live list ordered by id descending.
    pub fn observe_all(&self) -> TaskListSubscription {
        TaskListSubscription {
            snapshots: self.snapshots.clone(),
            replayed: false,
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> TaskSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Queues an insert; resolves to the stored id.
    pub fn insert(&self, task: Task) -> MutationHandle<TaskId> {
        self.submit(|reply| StoreCommand::Insert(task, reply))
    }

    /// Queues a full replace by id; a missing id is a no-op.
    pub fn update(&self, task: Task) -> MutationHandle<()> {
        self.submit(|reply| StoreCommand::Update(task, reply))
    }

    /// Queues a delete by id; a missing id is a no-op.
    pub fn delete_by_id(&self, id: TaskId) -> MutationHandle<()> {
        self.submit(|reply| StoreCommand::Delete(id, reply))
    }

    fn submit<T>(&self, command: impl FnOnce(Reply<T>) -> StoreCommand) -> MutationHandle<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send(command(reply_tx)).is_err() {
            // The rejected command owns `reply_tx`; dropping it resolves the
            // handle with `StoreError::Closed`.
            warn!("event=task_store_submit module=store status=error error_code=store_closed");
        }
        MutationHandle { reply: reply_rx }
    }
}

fn run_writer(
    conn: Connection,
    mut commands: mpsc::UnboundedReceiver<StoreCommand>,
    snapshots: watch::Sender<TaskSnapshot>,
) {
    while let Some(command) = commands.blocking_recv() {
        let started_at = Instant::now();
        let op = command.op_name();
        let repo = SqliteTaskRepository::new(&conn);

        let ok = match command {
            StoreCommand::Insert(task, reply) => {
                let written = repo.insert_task(&task).map_err(StoreError::from);
                if written.is_ok() {
                    refresh(&repo, &snapshots, op);
                }
                finish(reply, written)
            }
            StoreCommand::Update(task, reply) => {
                let written = repo.update_task(&task).map_err(StoreError::from).map(|matched| {
                    if !matched {
                        debug!(
                            "event=task_store_write module=store status=noop op=update id={}",
                            task.id
                        );
                    }
                });
                if written.is_ok() {
                    refresh(&repo, &snapshots, op);
                }
                finish(reply, written)
            }
            StoreCommand::Delete(id, reply) => {
                let written = repo.delete_task(id).map_err(StoreError::from).map(|removed| {
                    if !removed {
                        debug!(
                            "event=task_store_write module=store status=noop op=delete id={}",
                            id
                        );
                    }
                });
                if written.is_ok() {
                    refresh(&repo, &snapshots, op);
                }
                finish(reply, written)
            }
        };

        if ok {
            debug!(
                "event=task_store_write module=store status=ok op={} duration_ms={}",
                op,
                started_at.elapsed().as_millis()
            );
        }
    }

    info!("event=task_store_stop module=store status=ok");
}

/// Re-reads the list and publishes it. A failed re-read keeps the previous
/// snapshot; the write itself already committed.
fn refresh(
    repo: &SqliteTaskRepository<'_>,
    snapshots: &watch::Sender<TaskSnapshot>,
    op: &'static str,
) {
    match repo.list_tasks() {
        Ok(tasks) => {
            snapshots.send_replace(Arc::new(tasks));
        }
        Err(err) => {
            warn!(
                "event=task_store_publish module=store status=error op={} error_code=refresh_failed error={}",
                op, err
            );
        }
    }
}

fn finish<T>(reply: Reply<T>, result: StoreResult<T>) -> bool {
    let ok = result.is_ok();
    if let Err(err) = &result {
        error!(
            "event=task_store_write module=store status=error error_code=write_failed error={}",
            err
        );
    }
    // Receiver may already be gone for fire-and-forget callers.
    let _ = reply.send(result);
    ok
}
