//! Core domain logic for the daily-routine companion.
//! This crate is the single source of truth for task and day-flow invariants.

pub mod config;
pub mod db;
pub mod flow;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{CoreConfig, FlowTimings};
pub use flow::machine::{initial_session, transition, DayFlowMachine, DayFlowSession, FlowEffect, Transition};
pub use flow::persistence::{DayFlowPersistence, DayFlowPersistentState};
pub use flow::phase::{
    confirmation_message, DayFlowEvent, DayPhase, Focus, Mood, TomorrowStart, FIRST_MOVE_STEPS,
};
pub use flow::runner::{DayFlowRunner, DayFlowSnapshot};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{Category, Task, TaskId, TaskValidationError, UNASSIGNED_TASK_ID};
pub use repo::preference_repo::{
    PreferenceError, PreferenceResult, PreferenceStore, SqlitePreferenceStore,
};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_list_service::{apply_filter, is_day_list_cleared, TaskFilter, TaskListService};
pub use service::weekly_goal_service::{WeeklyGoal, WeeklyGoalBoard};
pub use store::task_store::{
    MutationHandle, StoreError, StoreResult, TaskListSubscription, TaskSnapshot, TaskStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
