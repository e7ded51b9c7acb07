//! Phase, event and choice types of the day flow.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Number of micro-tasks on the first-move screen.
pub const FIRST_MOVE_STEP_COUNT: usize = 3;

/// Labels of the first-move micro-tasks, by step index.
pub const FIRST_MOVE_STEPS: [&str; FIRST_MOVE_STEP_COUNT] = [
    "Arbeitsplatz öffnen",
    "90 Sekunden meditieren",
    "Zwei Übungen zum Strecken",
];

/// The user's single intention for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    #[serde(rename = "Großer Schritt")]
    BigStep,
    #[serde(rename = "Konstant bleiben")]
    StayConsistent,
    #[serde(rename = "Sauber abschließen")]
    FinishCleanly,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::BigStep, Focus::StayConsistent, Focus::FinishCleanly];

    /// Text shown on the focus button and persisted as `selected_focus`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BigStep => "Großer Schritt",
            Self::StayConsistent => "Konstant bleiben",
            Self::FinishCleanly => "Sauber abschließen",
        }
    }

    /// Parses a persisted focus. Unknown or empty text is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|focus| focus.as_str() == value)
    }
}

impl Display for Focus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line shown on the confirmation phase for the chosen focus.
pub fn confirmation_message(focus: Option<Focus>) -> &'static str {
    match focus {
        Some(Focus::BigStep) => "Mut wird heute belohnt.",
        Some(Focus::StayConsistent) => "Beständigkeit ist der Schlüssel.",
        Some(Focus::FinishCleanly) => "Klarheit bringt neue Energie.",
        None => "Fokus gesetzt.",
    }
}

/// Midday self-assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Good,
    Okay,
    Bad,
}

/// How tomorrow should start, picked during tomorrow setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TomorrowStart {
    #[serde(rename = "Großer Start")]
    BigStart,
    #[serde(rename = "Ruhiger Start")]
    CalmStart,
    #[serde(rename = "Konstanter Schritt")]
    SteadyStep,
}

impl TomorrowStart {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BigStart => "Großer Start",
            Self::CalmStart => "Ruhiger Start",
            Self::SteadyStep => "Konstanter Schritt",
        }
    }
}

/// Current step of the guided day, with phase-local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DayPhase {
    MorningIntro,
    MorningFocus,
    MorningConfirmation,
    FirstMove {
        steps: [bool; FIRST_MOVE_STEP_COUNT],
    },
    FirstMoveSuccess,
    DayTaskList,
    PlanningOverview,
    PlanningWeekly,
    PlanningLongTerm,
    MiddayReset {
        mood: Option<Mood>,
    },
    EveningClosure,
    TomorrowSetup {
        choice: Option<TomorrowStart>,
    },
    /// Idle end of the day: the plain to-do list.
    TaskList,
}

impl DayPhase {
    /// Entry state of the first-move phase, nothing checked.
    pub const FIRST_MOVE: DayPhase = DayPhase::FirstMove {
        steps: [false; FIRST_MOVE_STEP_COUNT],
    };

    /// Stable snake_case name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MorningIntro => "morning_intro",
            Self::MorningFocus => "morning_focus",
            Self::MorningConfirmation => "morning_confirmation",
            Self::FirstMove { .. } => "first_move",
            Self::FirstMoveSuccess => "first_move_success",
            Self::DayTaskList => "day_task_list",
            Self::PlanningOverview => "planning_overview",
            Self::PlanningWeekly => "planning_weekly",
            Self::PlanningLongTerm => "planning_long_term",
            Self::MiddayReset { .. } => "midday_reset",
            Self::EveningClosure => "evening_closure",
            Self::TomorrowSetup { .. } => "tomorrow_setup",
            Self::TaskList => "task_list",
        }
    }

    /// Whether the presentation layer should bind the task list engine.
    pub fn shows_tasks(&self) -> bool {
        matches!(self, Self::DayTaskList | Self::TaskList)
    }
}

/// User intents and timeouts that drive the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum DayFlowEvent {
    IntroFinished,
    FocusChosen(Focus),
    ConfirmationFinished,
    /// Check or uncheck one first-move step by index.
    FirstMoveStepToggled(usize),
    FirstMoveSuccessFinished,
    AllTasksCleared,
    PlanningRequested,
    WeeklyPlanningOpened,
    LongTermGoalsOpened,
    PlanningBack,
    MoodSelected(Mood),
    FocusTimerStarted,
    EveningFinished,
    TomorrowOptionSelected(TomorrowStart),
    TomorrowSetupFinished,
}
