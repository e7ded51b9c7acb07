//! Day-flow state machine.
//!
//! # Responsibility
//! - Compute the start session from persisted state and today's date.
//! - Apply `transition` results and their persistence side effects.
//!
//! # Invariants
//! - `is_first_run_today` is fixed when the session starts.
//! - Events that do not apply to the current phase change nothing.
//! - `generation` grows by one per applied transition and never otherwise.

use crate::flow::persistence::{format_run_date, DayFlowPersistence, DayFlowPersistentState};
use crate::flow::phase::{
    DayFlowEvent, DayPhase, Focus, Mood, TomorrowStart, FIRST_MOVE_STEP_COUNT,
};
use crate::repo::preference_repo::PreferenceStore;
use chrono::{Local, NaiveDate};
use log::{debug, info};

/// Transient session state of one process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayFlowSession {
    pub phase: DayPhase,
    pub selected_focus: Option<Focus>,
    pub is_first_run_today: bool,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEffect {
    PersistFocus(Focus),
}

/// Result of applying one event to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub session: DayFlowSession,
    pub effect: Option<FlowEffect>,
}

impl Transition {
    fn to(session: &DayFlowSession, phase: DayPhase) -> Self {
        Self {
            session: DayFlowSession { phase, ..*session },
            effect: None,
        }
    }
}

/// Computes the session a process start begins with.
///
/// Returns the session and whether `today` must be persisted as the new
/// last run date.
pub fn initial_session(state: &DayFlowPersistentState, today: &str) -> (DayFlowSession, bool) {
    let is_first_run_today = state.last_run_date.as_deref() != Some(today);
    if is_first_run_today {
        let session = DayFlowSession {
            phase: DayPhase::MorningIntro,
            selected_focus: None,
            is_first_run_today,
        };
        return (session, true);
    }

    let stored_focus = state.selected_focus.as_deref().and_then(Focus::parse);
    let phase = if stored_focus.is_some() {
        DayPhase::MorningConfirmation
    } else {
        DayPhase::MorningIntro
    };
    let session = DayFlowSession {
        phase,
        selected_focus: stored_focus,
        is_first_run_today,
    };
    (session, false)
}

/// Pure transition function. `None` means the event does not apply.
pub fn transition(session: &DayFlowSession, event: DayFlowEvent) -> Option<Transition> {
    use DayFlowEvent as E;
    use DayPhase as P;

    let next = match (session.phase, event) {
        (P::MorningIntro, E::IntroFinished) => Transition::to(session, P::MorningFocus),
        (P::MorningFocus, E::FocusChosen(focus)) => Transition {
            session: DayFlowSession {
                phase: P::MorningConfirmation,
                selected_focus: Some(focus),
                ..*session
            },
            effect: Some(FlowEffect::PersistFocus(focus)),
        },
        (P::MorningConfirmation, E::ConfirmationFinished) => {
            if session.is_first_run_today {
                Transition::to(session, P::FIRST_MOVE)
            } else {
                Transition::to(session, P::DayTaskList)
            }
        }
        (P::FirstMove { mut steps }, E::FirstMoveStepToggled(index))
            if index < FIRST_MOVE_STEP_COUNT =>
        {
            steps[index] = !steps[index];
            if steps.iter().all(|done| *done) {
                Transition::to(session, P::FirstMoveSuccess)
            } else {
                Transition::to(session, P::FirstMove { steps })
            }
        }
        (P::FirstMoveSuccess, E::FirstMoveSuccessFinished) => {
            Transition::to(session, P::DayTaskList)
        }
        (P::DayTaskList, E::AllTasksCleared) => {
            Transition::to(session, P::MiddayReset { mood: None })
        }
        (P::DayTaskList, E::PlanningRequested) => Transition::to(session, P::PlanningOverview),
        (P::PlanningOverview, E::WeeklyPlanningOpened) => {
            Transition::to(session, P::PlanningWeekly)
        }
        (P::PlanningOverview, E::LongTermGoalsOpened) => {
            Transition::to(session, P::PlanningLongTerm)
        }
        (P::PlanningLongTerm, E::PlanningBack) => Transition::to(session, P::PlanningOverview),
        (P::MiddayReset { .. }, E::MoodSelected(mood)) => {
            Transition::to(session, P::MiddayReset { mood: Some(mood) })
        }
        (P::MiddayReset { .. }, E::FocusTimerStarted) => {
            Transition::to(session, P::EveningClosure)
        }
        (P::EveningClosure, E::EveningFinished) => {
            Transition::to(session, P::TomorrowSetup { choice: None })
        }
        (P::TomorrowSetup { .. }, E::TomorrowOptionSelected(choice)) => Transition::to(
            session,
            P::TomorrowSetup {
                choice: Some(choice),
            },
        ),
        (P::TomorrowSetup { .. }, E::TomorrowSetupFinished) => {
            Transition::to(session, P::TaskList)
        }
        _ => return None,
    };
    Some(next)
}

/// Stateful day flow bound to its persistence.
pub struct DayFlowMachine<P: PreferenceStore> {
    session: DayFlowSession,
    persistence: DayFlowPersistence<P>,
    generation: u64,
}

impl<P: PreferenceStore> DayFlowMachine<P> {
    /// Starts a session for `today`.
    ///
    /// On the first start of a day the date is persisted immediately, so a
    /// second start on the same day takes the short path.
    pub fn start(mut persistence: DayFlowPersistence<P>, today: NaiveDate) -> Self {
        let today_text = format_run_date(today);
        let stored = persistence.load();
        let (session, persist_date) = initial_session(&stored, &today_text);
        if persist_date {
            persistence.record_new_day(today);
        }

        info!(
            "event=day_flow_start module=flow status=ok phase={} first_run_today={} focus_restored={}",
            session.phase.name(),
            session.is_first_run_today,
            session.selected_focus.is_some()
        );

        Self {
            session,
            persistence,
            generation: 0,
        }
    }

    /// Starts a session for the local calendar date.
    pub fn start_today(persistence: DayFlowPersistence<P>) -> Self {
        Self::start(persistence, Local::now().date_naive())
    }

    /// Applies `event`. Returns whether the session changed.
    pub fn dispatch(&mut self, event: DayFlowEvent) -> bool {
        let Some(next) = transition(&self.session, event) else {
            debug!(
                "event=day_flow_transition module=flow status=ignored phase={} trigger={:?}",
                self.session.phase.name(),
                event
            );
            return false;
        };

        if let Some(FlowEffect::PersistFocus(focus)) = next.effect {
            self.persistence.record_focus(focus);
        }

        info!(
            "event=day_flow_transition module=flow status=ok from={} to={}",
            self.session.phase.name(),
            next.session.phase.name()
        );
        self.session = next.session;
        self.generation += 1;
        true
    }

    pub fn session(&self) -> &DayFlowSession {
        &self.session
    }

    pub fn current_phase(&self) -> DayPhase {
        self.session.phase
    }

    pub fn selected_focus(&self) -> Option<Focus> {
        self.session.selected_focus
    }

    pub fn is_first_run_today(&self) -> bool {
        self.session.is_first_run_today
    }

    /// Number of transitions applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn persistence(&self) -> &DayFlowPersistence<P> {
        &self.persistence
    }

    pub fn finish_intro(&mut self) -> bool {
        self.dispatch(DayFlowEvent::IntroFinished)
    }

    pub fn choose_focus(&mut self, focus: Focus) -> bool {
        self.dispatch(DayFlowEvent::FocusChosen(focus))
    }

    pub fn finish_confirmation(&mut self) -> bool {
        self.dispatch(DayFlowEvent::ConfirmationFinished)
    }

    pub fn toggle_first_move_step(&mut self, index: usize) -> bool {
        self.dispatch(DayFlowEvent::FirstMoveStepToggled(index))
    }

    pub fn finish_first_move_success(&mut self) -> bool {
        self.dispatch(DayFlowEvent::FirstMoveSuccessFinished)
    }

    pub fn clear_day_tasks(&mut self) -> bool {
        self.dispatch(DayFlowEvent::AllTasksCleared)
    }

    pub fn request_planning(&mut self) -> bool {
        self.dispatch(DayFlowEvent::PlanningRequested)
    }

    pub fn open_weekly_planning(&mut self) -> bool {
        self.dispatch(DayFlowEvent::WeeklyPlanningOpened)
    }

    pub fn open_long_term_goals(&mut self) -> bool {
        self.dispatch(DayFlowEvent::LongTermGoalsOpened)
    }

    pub fn back_to_planning(&mut self) -> bool {
        self.dispatch(DayFlowEvent::PlanningBack)
    }

    pub fn select_mood(&mut self, mood: Mood) -> bool {
        self.dispatch(DayFlowEvent::MoodSelected(mood))
    }

    pub fn start_focus_timer(&mut self) -> bool {
        self.dispatch(DayFlowEvent::FocusTimerStarted)
    }

    pub fn finish_evening(&mut self) -> bool {
        self.dispatch(DayFlowEvent::EveningFinished)
    }

    pub fn select_tomorrow_option(&mut self, choice: TomorrowStart) -> bool {
        self.dispatch(DayFlowEvent::TomorrowOptionSelected(choice))
    }

    pub fn finish_tomorrow_setup(&mut self) -> bool {
        self.dispatch(DayFlowEvent::TomorrowSetupFinished)
    }
}
