//! Session timer implementation.
//!
//! The timer is a clock-free state machine. It does not own a thread or a
//! timer registration; the caller invokes `tick()` once per elapsed second
//! (see [`crate::driver::TimerDriver`] for the wiring to a real clock).
//!
//! ## State Transitions
//!
//! ```text
//! Focus(paused) -start-> Focus(running) -tick*N-> Break(paused) -start-> ...
//! ```
//!
//! Every phase boundary halts the countdown. The next phase waits for an
//! explicit `start()`.
//!
//! ## Usage
//!
//! ```
//! use deepwork_core::{Phase, SessionTimer};
//!
//! let mut timer = SessionTimer::default();
//! timer.start();
//! for _ in 0..1500 {
//!     timer.tick();
//! }
//! assert_eq!(timer.state().mode, Phase::Break);
//! assert_eq!(timer.state().completed_focus_sessions, 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Phase, PhaseDurations};
use crate::events::{Event, SubscriptionId, Subscribers};

/// The countdown state of one Deep Work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Phase,
    pub remaining_secs: u64,
    pub running: bool,
    pub completed_focus_sessions: u32,
}

/// What happened when a tick crossed a phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBoundary {
    pub from: Phase,
    pub to: Phase,
}

impl SessionState {
    /// Fresh session: paused at the start of a Focus phase.
    pub fn initial(durations: &PhaseDurations) -> Self {
        Self {
            mode: Phase::Focus,
            remaining_secs: durations.of(Phase::Focus),
            running: false,
            completed_focus_sessions: 0,
        }
    }

    /// Advance by one second.
    ///
    /// Ticks while paused are no-ops. Reaching zero flips the phase, refills
    /// the countdown, halts, and counts the session if Focus just elapsed.
    pub fn ticked(self, durations: &PhaseDurations) -> (Self, Option<PhaseBoundary>) {
        if !self.running {
            return (self, None);
        }

        let remaining_secs = self.remaining_secs.saturating_sub(1);
        if remaining_secs > 0 {
            return (
                Self {
                    remaining_secs,
                    ..self
                },
                None,
            );
        }

        let from = self.mode;
        let to = from.other();
        let completed_focus_sessions = if from == Phase::Focus {
            self.completed_focus_sessions.saturating_add(1)
        } else {
            self.completed_focus_sessions
        };
        (
            Self {
                mode: to,
                remaining_secs: durations.of(to),
                running: false,
                completed_focus_sessions,
            },
            Some(PhaseBoundary { from, to }),
        )
    }

    /// 0.0 .. 100.0 progress within the current phase.
    pub fn progress_pct(&self, durations: &PhaseDurations) -> f64 {
        let total = durations.of(self.mode);
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Render-ready copy of the session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Phase,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub running: bool,
    pub completed_focus_sessions: u32,
    pub progress_pct: f64,
    pub clock: String,
    pub at: DateTime<Utc>,
}

/// Owns the session state and the observers interested in it.
#[derive(Debug)]
pub struct SessionTimer {
    durations: PhaseDurations,
    state: SessionState,
    subscribers: Subscribers,
}

impl SessionTimer {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            state: SessionState::initial(&durations),
            durations,
            subscribers: Subscribers::new(),
        }
    }

    /// Resume from an arbitrary state.
    ///
    /// `remaining_secs` is clamped into the current phase's duration.
    pub fn with_state(durations: PhaseDurations, mut state: SessionState) -> Self {
        state.remaining_secs = state.remaining_secs.min(durations.of(state.mode));
        Self {
            durations,
            state,
            subscribers: Subscribers::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn total_secs(&self) -> u64 {
        self.durations.of(self.state.mode)
    }

    pub fn progress_pct(&self) -> f64 {
        self.state.progress_pct(&self.durations)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.total_secs(),
            running: self.state.running,
            completed_focus_sessions: self.state.completed_focus_sessions,
            progress_pct: self.progress_pct(),
            clock: self.state.clock(),
            at: Utc::now(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }
        self.state.running = true;
        tracing::debug!(
            phase = %self.state.mode,
            remaining_secs = self.state.remaining_secs,
            "timer started"
        );
        self.emit(Event::TimerStarted {
            phase: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        tracing::debug!(remaining_secs = self.state.remaining_secs, "timer paused");
        self.emit(Event::TimerPaused {
            phase: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Play/pause button.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Halt and refill the current phase. Mode and session count stay.
    pub fn reset(&mut self) -> Option<Event> {
        self.state.running = false;
        self.state.remaining_secs = self.durations.of(self.state.mode);
        tracing::debug!(phase = %self.state.mode, "timer reset");
        self.emit(Event::TimerReset {
            phase: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Call once per elapsed second. Returns `Some(Event::PhaseChanged)` when
    /// a phase finishes.
    pub fn tick(&mut self) -> Option<Event> {
        let (next, boundary) = self.state.ticked(&self.durations);
        self.state = next;
        let boundary = boundary?;
        tracing::info!(
            from = %boundary.from,
            to = %boundary.to,
            completed_focus_sessions = next.completed_focus_sessions,
            "phase boundary reached"
        );
        self.emit(Event::PhaseChanged {
            from: boundary.from,
            to: boundary.to,
            remaining_secs: next.remaining_secs,
            completed_focus_sessions: next.completed_focus_sessions,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn emit(&mut self, event: Event) -> Option<Event> {
        self.subscribers.notify(&event);
        Some(event)
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(PhaseDurations::default())
    }
}
