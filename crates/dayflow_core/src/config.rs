//! Core configuration.
//!
//! # Responsibility
//! - Collect file locations, log level and flow timings in one value built
//!   at the composition root.
//!
//! # Invariants
//! - Every field has a default, so partial config documents are accepted.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_FILE_NAME: &str = "dayflow.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Auto-advance delays of the timed phases, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTimings {
    pub morning_intro_ms: u64,
    pub morning_confirmation_ms: u64,
    pub first_move_success_ms: u64,
    /// Counted from the tomorrow-setup choice.
    pub tomorrow_completion_ms: u64,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            morning_intro_ms: 3_500,
            morning_confirmation_ms: 2_500,
            first_move_success_ms: 2_500,
            tomorrow_completion_ms: 3_000,
        }
    }
}

impl FlowTimings {
    pub fn morning_intro(&self) -> Duration {
        Duration::from_millis(self.morning_intro_ms)
    }

    pub fn morning_confirmation(&self) -> Duration {
        Duration::from_millis(self.morning_confirmation_ms)
    }

    pub fn first_move_success(&self) -> Duration {
        Duration::from_millis(self.first_move_success_ms)
    }

    pub fn tomorrow_completion(&self) -> Duration {
        Duration::from_millis(self.tomorrow_completion_ms)
    }
}

/// Process-level settings for the day-flow core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding the database and the `logs` folder.
    pub data_dir: PathBuf,
    pub database_file: String,
    pub log_level: String,
    pub timings: FlowTimings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database_file: DEFAULT_DB_FILE_NAME.to_string(),
            log_level: default_log_level().to_string(),
            timings: FlowTimings::default(),
        }
    }
}

impl CoreConfig {
    /// Default settings rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}
