//! Async driver for the day flow with cancellable auto-advance timers.
//!
//! # Responsibility
//! - Publish the current session to observers through a watch channel.
//! - Schedule the timeout of timed phases and cancel it when the phase is
//!   left or the runner is torn down.
//!
//! # Invariants
//! - At most one timer is pending; it belongs to the current generation.
//! - A timer never fires after its generation is superseded, after
//!   `shutdown`, or after the runner is dropped.

use crate::config::FlowTimings;
use crate::flow::machine::DayFlowMachine;
use crate::flow::phase::{DayFlowEvent, DayPhase, Focus};
use crate::repo::preference_repo::PreferenceStore;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Session state as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayFlowSnapshot {
    pub phase: DayPhase,
    pub selected_focus: Option<Focus>,
    pub is_first_run_today: bool,
    /// Transition counter; timers are tagged with it.
    pub generation: u64,
}

impl DayFlowSnapshot {
    fn of<P: PreferenceStore>(machine: &DayFlowMachine<P>) -> Self {
        Self {
            phase: machine.current_phase(),
            selected_focus: machine.selected_focus(),
            is_first_run_today: machine.is_first_run_today(),
            generation: machine.generation(),
        }
    }
}

/// Timeout and event of a timed phase.
///
/// Tomorrow setup only times out once a choice has been made.
pub fn auto_advance(phase: &DayPhase, timings: &FlowTimings) -> Option<(Duration, DayFlowEvent)> {
    match phase {
        DayPhase::MorningIntro => Some((timings.morning_intro(), DayFlowEvent::IntroFinished)),
        DayPhase::MorningConfirmation => Some((
            timings.morning_confirmation(),
            DayFlowEvent::ConfirmationFinished,
        )),
        DayPhase::FirstMoveSuccess => Some((
            timings.first_move_success(),
            DayFlowEvent::FirstMoveSuccessFinished,
        )),
        DayPhase::TomorrowSetup {
            choice: Some(_),
        } => Some((
            timings.tomorrow_completion(),
            DayFlowEvent::TomorrowSetupFinished,
        )),
        _ => None,
    }
}

struct Shared<P: PreferenceStore> {
    machine: Mutex<DayFlowMachine<P>>,
    snapshots: watch::Sender<DayFlowSnapshot>,
    pending_timer: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
    timings: FlowTimings,
}

/// Owner of a running day flow.
///
/// Dropping the runner cancels every pending timer.
pub struct DayFlowRunner<P>
where
    P: PreferenceStore + Send + 'static,
{
    shared: Arc<Shared<P>>,
}

impl<P> DayFlowRunner<P>
where
    P: PreferenceStore + Send + 'static,
{
    /// Wraps a started machine and arms the timer of its start phase.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new(machine: DayFlowMachine<P>, timings: FlowTimings) -> Self {
        let snapshot = DayFlowSnapshot::of(&machine);
        let (snapshots, _) = watch::channel(snapshot);
        let shared = Arc::new(Shared {
            machine: Mutex::new(machine),
            snapshots,
            pending_timer: Mutex::new(None),
            shutdown: CancellationToken::new(),
            timings,
        });

        arm_timer(&shared, snapshot);
        Self { shared }
    }

    /// Live session snapshots; the current one is replayed.
    pub fn subscribe(&self) -> watch::Receiver<DayFlowSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> DayFlowSnapshot {
        *self.shared.snapshots.borrow()
    }

    pub fn current_phase(&self) -> DayPhase {
        self.snapshot().phase
    }

    pub fn selected_focus(&self) -> Option<Focus> {
        self.snapshot().selected_focus
    }

    /// Applies a user intent. Returns whether the session changed.
    ///
    /// Leaving a timed phase this way cancels its timer.
    pub fn dispatch(&self, event: DayFlowEvent) -> bool {
        apply(&self.shared, event, None)
    }

    /// Cancels pending timers and rejects further events.
    pub fn shutdown(&self) {
        if !self.shared.shutdown.is_cancelled() {
            debug!("event=day_flow_shutdown module=flow status=ok");
        }
        self.shared.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }
}

impl<P> Drop for DayFlowRunner<P>
where
    P: PreferenceStore + Send + 'static,
{
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}

fn apply<P>(shared: &Arc<Shared<P>>, event: DayFlowEvent, timer_generation: Option<u64>) -> bool
where
    P: PreferenceStore + Send + 'static,
{
    if shared.shutdown.is_cancelled() {
        return false;
    }

    let mut machine = lock(&shared.machine);
    if let Some(expected) = timer_generation {
        if machine.generation() != expected {
            debug!(
                "event=day_flow_timer module=flow status=stale expected_generation={} generation={}",
                expected,
                machine.generation()
            );
            return false;
        }
    }
    if !machine.dispatch(event) {
        return false;
    }

    let snapshot = DayFlowSnapshot::of(&machine);
    shared.snapshots.send_replace(snapshot);
    // Armed under the machine lock so timers follow transition order.
    arm_timer(shared, snapshot);
    true
}

fn arm_timer<P>(shared: &Arc<Shared<P>>, snapshot: DayFlowSnapshot)
where
    P: PreferenceStore + Send + 'static,
{
    let mut pending = lock(&shared.pending_timer);
    if let Some(previous) = pending.take() {
        previous.cancel();
    }

    let Some((delay, event)) = auto_advance(&snapshot.phase, &shared.timings) else {
        return;
    };

    let token = shared.shutdown.child_token();
    *pending = Some(token.clone());
    let weak: Weak<Shared<P>> = Arc::downgrade(shared);
    let generation = snapshot.generation;
    let phase = snapshot.phase.name();
    debug!(
        "event=day_flow_timer module=flow status=armed phase={} delay_ms={}",
        phase,
        delay.as_millis()
    );

    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("event=day_flow_timer module=flow status=cancelled phase={phase}");
            }
            () = tokio::time::sleep(delay) => {
                if let Some(shared) = weak.upgrade() {
                    apply(&shared, event, Some(generation));
                }
            }
        }
    });
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
