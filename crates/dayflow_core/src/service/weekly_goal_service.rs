//! Weekly goals for the planning sub-flow.
//!
//! Goals live in memory only and are gone after a restart.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// A recurring goal for the current week, e.g. "Laufen", three times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub id: u64,
    pub title: String,
    /// Planned repetitions per week.
    pub frequency: u32,
}

/// In-memory, push-updating list of weekly goals.
pub struct WeeklyGoalBoard {
    goals: watch::Sender<Arc<Vec<WeeklyGoal>>>,
    next_id: u64,
}

impl Default for WeeklyGoalBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklyGoalBoard {
    pub fn new() -> Self {
        let (goals, _) = watch::channel(Arc::new(Vec::new()));
        Self { goals, next_id: 1 }
    }

    /// Appends a goal and returns its id.
    ///
    /// Blank titles and a zero frequency are ignored.
    pub fn add_goal(&mut self, title: &str, frequency: u32) -> Option<u64> {
        let title = title.trim();
        if title.is_empty() || frequency == 0 {
            debug!("event=weekly_goal_add module=service status=skipped");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.goals.send_modify(|goals| {
            Arc::make_mut(goals).push(WeeklyGoal {
                id,
                title: title.to_string(),
                frequency,
            });
        });
        debug!("event=weekly_goal_add module=service status=ok id={id} frequency={frequency}");
        Some(id)
    }

    /// Live goal list in insertion order; the current value is replayed.
    pub fn goals(&self) -> watch::Receiver<Arc<Vec<WeeklyGoal>>> {
        self.goals.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Vec<WeeklyGoal>> {
        self.goals.borrow().clone()
    }
}
