mod engine;
mod phase;

pub use engine::{format_clock, PhaseBoundary, SessionState, SessionTimer, Snapshot};
pub use phase::{Phase, PhaseDurations, DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS};
