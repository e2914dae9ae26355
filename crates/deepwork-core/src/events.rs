use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Snapshot};

/// Every state change of a session produces an Event.
/// Front ends render from them; subscribers react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran out. The timer is halted at the start of `to`.
    PhaseChanged {
        from: Phase,
        to: Phase,
        remaining_secs: u64,
        completed_focus_sessions: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot(Snapshot),
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::PhaseChanged { at, .. } => *at,
            Event::StateSnapshot(snapshot) => snapshot.at,
        }
    }
}

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Event) + Send>;

/// Ordered observer list. Callbacks run synchronously, in registration order.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &Event) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn reset_event() -> Event {
        Event::TimerReset {
            phase: Phase::Focus,
            remaining_secs: 1500,
            at: Utc::now(),
        }
    }

    #[test]
    fn notify_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscribers::new();
        for name in ["a", "b", "c"] {
            let log = Arc::clone(&log);
            subs.subscribe(move |_| log.lock().unwrap().push(name));
        }
        subs.notify(&reset_event());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_callback() {
        let count = Arc::new(Mutex::new(0));
        let mut subs = Subscribers::new();
        let c1 = Arc::clone(&count);
        let first = subs.subscribe(move |_| *c1.lock().unwrap() += 1);
        let c2 = Arc::clone(&count);
        subs.subscribe(move |_| *c2.lock().unwrap() += 10);

        assert!(subs.unsubscribe(first));
        assert!(!subs.unsubscribe(first));
        assert_eq!(subs.len(), 1);

        subs.notify(&reset_event());
        assert_eq!(*count.lock().unwrap(), 10);
    }

    #[test]
    fn event_json_is_tagged() {
        let json = serde_json::to_value(reset_event()).unwrap();
        assert_eq!(json["type"], "timer_reset");
        assert_eq!(json["phase"], "focus");
        assert_eq!(json["remaining_secs"], 1500);
    }
}
