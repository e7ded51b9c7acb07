//! Core use-case services.
//!
//! # Responsibility
//! - Turn user intents into store mutations.
//! - Keep presentation layers decoupled from storage details.

pub mod task_list_service;
pub mod weekly_goal_service;
