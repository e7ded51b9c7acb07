//! Guided day flow: phases, transitions, persistence and timers.
//!
//! # Responsibility
//! - Decide the start phase once per process start.
//! - Advance through the day phases on user intents and timeouts.
//!
//! # Invariants
//! - Transitions are computed by a pure function; side effects are applied
//!   by `DayFlowMachine` only.
//! - A stored focus is trusted only when it was written today.

pub mod machine;
pub mod persistence;
pub mod phase;
pub mod runner;
