//! Wires a [`SessionTimer`] to a real clock.
//!
//! The driver owns exactly one ticker registration while the timer runs and
//! releases it on pause, reset, phase boundary and teardown. State changes
//! are published two ways:
//!
//! - [`TimerDriver::watch`]: the latest [`SessionState`] as an observable value
//! - [`TimerDriver::events`]: every [`Event`] as a broadcast stream

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::error::Result;
use crate::events::Event;
use crate::ticker::{Ticker, TickerHandle};
use crate::timer::{PhaseDurations, SessionState, SessionTimer, Snapshot};

/// One second, the period the countdown is specified in.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;

pub struct TimerDriver {
    timer: Arc<Mutex<SessionTimer>>,
    tick_period: Duration,
    ticker: Option<TickerHandle>,
    state_tx: Arc<watch::Sender<SessionState>>,
    event_tx: broadcast::Sender<Event>,
}

impl TimerDriver {
    pub fn new(durations: PhaseDurations, tick_period: Duration) -> Self {
        Self::from_timer(SessionTimer::new(durations), tick_period)
    }

    pub fn from_timer(mut timer: SessionTimer, tick_period: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let forward = event_tx.clone();
        timer.subscribe(move |event| {
            // No receivers is fine.
            let _ = forward.send(event.clone());
        });
        let (state_tx, _) = watch::channel(timer.state());
        Self {
            timer: Arc::new(Mutex::new(timer)),
            tick_period,
            ticker: None,
            state_tx: Arc::new(state_tx),
            event_tx,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(TickerHandle::is_active)
    }

    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down and register the tick source.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick source cannot be registered (zero period
    /// or no tokio runtime). The timer is left paused in that case.
    pub fn start(&mut self) -> Result<Option<Event>> {
        let was_running = self.state().running;
        let event = self.apply(SessionTimer::start);
        if was_running && self.is_ticking() {
            return Ok(event);
        }
        // A halted timer's ticker may still be winding down after returning
        // `Break`; it will never tick again, so always replace it.
        self.release_ticker();

        let timer = Arc::clone(&self.timer);
        let state_tx = Arc::clone(&self.state_tx);
        let registered = Ticker::every(self.tick_period, move || {
            let mut timer = timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            timer.tick();
            let state = timer.state();
            state_tx.send_replace(state);
            if state.running {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });

        match registered {
            Ok(handle) => {
                self.ticker = Some(handle);
                Ok(event)
            }
            Err(e) => {
                self.apply(SessionTimer::pause);
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.release_ticker();
        self.apply(SessionTimer::pause)
    }

    /// # Errors
    ///
    /// See [`TimerDriver::start`].
    pub fn toggle(&mut self) -> Result<Option<Event>> {
        if self.state().running {
            Ok(self.pause())
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.release_ticker();
        self.apply(SessionTimer::reset)
    }

    /// Release the tick source. The timer is paused so the state stays
    /// consistent with the absence of a clock.
    pub fn shutdown(&mut self) {
        self.pause();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, SessionTimer> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn apply(&self, op: impl FnOnce(&mut SessionTimer) -> Option<Event>) -> Option<Event> {
        let mut timer = self.lock();
        let event = op(&mut timer);
        self.state_tx.send_replace(timer.state());
        event
    }

    fn release_ticker(&mut self) {
        if let Some(mut handle) = self.ticker.take() {
            handle.cancel();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.release_ticker();
    }
}
