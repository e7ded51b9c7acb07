//! Durable day-flow state: last run date and selected focus.
//!
//! # Responsibility
//! - Read both keys once at startup.
//! - Write them on the two side-effecting flow points.
//!
//! # Invariants
//! - A stored focus is only ever paired with the date it was chosen on;
//!   starting a new day clears it.
//! - Storage failures never reach the flow: reads degrade to the empty state
//!   (first run today), failed writes are logged and reported as `false`.

use crate::flow::phase::Focus;
use crate::repo::preference_repo::PreferenceStore;
use chrono::NaiveDate;
use log::{info, warn};

pub const LAST_RUN_DATE_KEY: &str = "last_run_date";
pub const SELECTED_FOCUS_KEY: &str = "selected_focus";

/// Date format of `last_run_date`.
pub const RUN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw persisted values; `None` means the key was never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayFlowPersistentState {
    pub last_run_date: Option<String>,
    pub selected_focus: Option<String>,
}

/// Formats a date the way it is stored under `last_run_date`.
pub fn format_run_date(date: NaiveDate) -> String {
    date.format(RUN_DATE_FORMAT).to_string()
}

/// Day-flow view over a preference store.
pub struct DayFlowPersistence<P: PreferenceStore> {
    store: P,
}

impl<P: PreferenceStore> DayFlowPersistence<P> {
    pub fn new(store: P) -> Self {
        Self { store }
    }

    /// Reads both keys. Any read failure yields the empty state.
    pub fn load(&self) -> DayFlowPersistentState {
        let loaded = self.store.get(LAST_RUN_DATE_KEY).and_then(|last_run_date| {
            let selected_focus = self.store.get(SELECTED_FOCUS_KEY)?;
            Ok(DayFlowPersistentState {
                last_run_date,
                selected_focus,
            })
        });

        match loaded {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "event=day_flow_load module=flow status=degraded error_code=prefs_unavailable error={}",
                    err
                );
                DayFlowPersistentState::default()
            }
        }
    }

    /// Opens a new day: clears the previous day's focus, then stores `date`
    /// as the last run date.
    ///
    /// The focus goes first so an interrupted write leaves the old date in
    /// place and the next start is still a first run.
    pub fn record_new_day(&mut self, date: NaiveDate) -> bool {
        if !self.write(SELECTED_FOCUS_KEY, "") {
            return false;
        }
        let value = format_run_date(date);
        self.write(LAST_RUN_DATE_KEY, &value)
    }

    /// Stores the focus chosen today.
    pub fn record_focus(&mut self, focus: Focus) -> bool {
        self.write(SELECTED_FOCUS_KEY, focus.as_str())
    }

    /// Underlying preference store.
    pub fn store(&self) -> &P {
        &self.store
    }

    fn write(&mut self, key: &'static str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => {
                info!("event=day_flow_save module=flow status=ok key={key}");
                true
            }
            Err(err) => {
                warn!(
                    "event=day_flow_save module=flow status=error key={} error_code=prefs_unavailable error={}",
                    key, err
                );
                false
            }
        }
    }
}
