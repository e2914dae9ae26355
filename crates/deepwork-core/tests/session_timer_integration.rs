//! Integration tests for the session timer state machine.

use deepwork_core::{Event, Phase, PhaseDurations, SessionState, SessionTimer};
use proptest::prelude::*;

fn resumed(mode: Phase, remaining_secs: u64, completed: u32) -> SessionTimer {
    SessionTimer::with_state(
        PhaseDurations::default(),
        SessionState {
            mode,
            remaining_secs,
            running: false,
            completed_focus_sessions: completed,
        },
    )
}

#[test]
fn test_focus_with_two_seconds_left() {
    let mut timer = resumed(Phase::Focus, 2, 0);
    timer.start();
    timer.tick();
    timer.tick();

    assert_eq!(
        timer.state(),
        SessionState {
            mode: Phase::Break,
            remaining_secs: 300,
            running: false,
            completed_focus_sessions: 1,
        }
    );
}

#[test]
fn test_break_with_one_second_left() {
    let mut timer = resumed(Phase::Break, 1, 0);
    timer.start();
    timer.tick();

    assert_eq!(
        timer.state(),
        SessionState {
            mode: Phase::Focus,
            remaining_secs: 1500,
            running: false,
            completed_focus_sessions: 0,
        }
    );
}

#[test]
fn test_full_pomodoro_cycle_with_defaults() {
    let mut timer = SessionTimer::default();
    let mut events = Vec::new();

    for _ in 0..2 {
        timer.start();
        while timer.is_running() {
            if let Some(event) = timer.tick() {
                events.push(event);
            }
        }
    }

    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        Event::PhaseChanged { from: Phase::Focus, to: Phase::Break, completed_focus_sessions: 1, .. }
    ));
    assert!(matches!(
        events[1],
        Event::PhaseChanged { from: Phase::Break, to: Phase::Focus, completed_focus_sessions: 1, .. }
    ));
    assert_eq!(timer.state(), SessionState::initial(&PhaseDurations::default()).with_count(1));
}

#[test]
fn test_custom_durations_drive_the_cycle() {
    let durations = PhaseDurations::new(50 * 60, 10 * 60).unwrap();
    let mut timer = SessionTimer::new(durations);
    assert_eq!(timer.state().remaining_secs, 3000);

    timer.start();
    for _ in 0..3000 {
        timer.tick();
    }
    assert_eq!(timer.state().mode, Phase::Break);
    assert_eq!(timer.state().remaining_secs, 600);
    assert_eq!(timer.snapshot().clock, "10:00");
}

#[test]
fn test_snapshot_event_serializes_with_type_tag() {
    let timer = SessionTimer::default();
    let json = serde_json::to_value(Event::StateSnapshot(timer.snapshot())).unwrap();
    assert_eq!(json["type"], "state_snapshot");
    assert_eq!(json["mode"], "focus");
    assert_eq!(json["clock"], "25:00");
    assert_eq!(json["running"], false);
}

trait WithCount {
    fn with_count(self, completed: u32) -> Self;
}

impl WithCount for SessionState {
    fn with_count(self, completed: u32) -> Self {
        SessionState {
            completed_focus_sessions: completed,
            ..self
        }
    }
}

fn phase() -> impl Strategy<Value = Phase> {
    prop_oneof![Just(Phase::Focus), Just(Phase::Break)]
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Pause,
    Toggle,
    Reset,
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Toggle),
        1 => Just(Op::Reset),
        8 => Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn ticking_remaining_times_crosses_exactly_one_boundary(
        focus in 1u64..3000,
        brk in 1u64..1000,
        mode in phase(),
        frac in 0.0f64..1.0,
        completed in 0u32..1000,
    ) {
        let durations = PhaseDurations::new(focus, brk).unwrap();
        let remaining = 1 + ((durations.of(mode) - 1) as f64 * frac) as u64;
        let mut timer = SessionTimer::with_state(durations, SessionState {
            mode,
            remaining_secs: remaining,
            running: false,
            completed_focus_sessions: completed,
        });

        timer.start();
        let mut boundaries = 0;
        for _ in 0..remaining {
            if timer.tick().is_some() {
                boundaries += 1;
            }
        }

        let state = timer.state();
        prop_assert_eq!(boundaries, 1);
        prop_assert_eq!(state.mode, mode.other());
        prop_assert_eq!(state.remaining_secs, durations.of(mode.other()));
        prop_assert!(!state.running);
        let expected = if mode == Phase::Focus { completed + 1 } else { completed };
        prop_assert_eq!(state.completed_focus_sessions, expected);
    }

    #[test]
    fn paused_timer_ignores_ticks(ticks_before in 0u64..100, ticks_after in 0usize..500) {
        let mut timer = SessionTimer::default();
        timer.start();
        for _ in 0..ticks_before {
            timer.tick();
        }
        timer.pause();
        let frozen = timer.state();
        for _ in 0..ticks_after {
            prop_assert!(timer.tick().is_none());
        }
        prop_assert_eq!(timer.state(), frozen);
    }

    #[test]
    fn reset_restores_phase_duration_only(
        mode in phase(),
        remaining in 0u64..1500,
        completed in 0u32..100,
        running in any::<bool>(),
    ) {
        let durations = PhaseDurations::default();
        let mut timer = SessionTimer::with_state(durations, SessionState {
            mode,
            remaining_secs: remaining,
            running,
            completed_focus_sessions: completed,
        });
        timer.reset();
        prop_assert_eq!(timer.state(), SessionState {
            mode,
            remaining_secs: durations.of(mode),
            running: false,
            completed_focus_sessions: completed,
        });
    }

    #[test]
    fn any_command_sequence_keeps_invariants(ops in prop::collection::vec(op(), 0..400)) {
        let durations = PhaseDurations::new(7, 3).unwrap();
        let mut timer = SessionTimer::new(durations);
        let mut focus_elapses = 0;

        for op in ops {
            let before = timer.state();
            let event = match op {
                Op::Start => timer.start(),
                Op::Pause => timer.pause(),
                Op::Toggle => timer.toggle(),
                Op::Reset => timer.reset(),
                Op::Tick => timer.tick(),
            };
            if let Some(Event::PhaseChanged { from: Phase::Focus, .. }) = event {
                focus_elapses += 1;
            }

            let state = timer.state();
            prop_assert!(state.remaining_secs >= 1);
            prop_assert!(state.remaining_secs <= durations.of(state.mode));
            prop_assert!(state.completed_focus_sessions >= before.completed_focus_sessions);
            if state.mode != before.mode {
                prop_assert!(!state.running);
            }
        }
        prop_assert_eq!(timer.state().completed_focus_sessions, focus_elapses);
    }
}
