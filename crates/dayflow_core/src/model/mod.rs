//! Domain model for the task list and the guided day flow.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Task identity is owned by the store; callers only hold copies.
//! - Categories form a closed set; unknown values are errors, never coerced.

pub mod task;
