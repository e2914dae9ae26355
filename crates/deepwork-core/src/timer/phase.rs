use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default Focus phase length: 25 minutes.
pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
/// Default Break phase length: 5 minutes.
pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    /// The phase that follows this one.
    pub fn other(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }

    /// Short label shown under the clock.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Phase::Focus => "Deep Work Mode",
            Phase::Break => "Break Time",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Phase::Focus => "Stay focused and avoid distractions",
            Phase::Break => "Recharge your mind",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Full length of each phase, in seconds.
///
/// Both values are non-zero; the countdown would otherwise start on a
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    focus_secs: u64,
    break_secs: u64,
}

impl PhaseDurations {
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` if either duration is zero.
    pub fn new(focus_secs: u64, break_secs: u64) -> Result<Self, ValidationError> {
        if focus_secs == 0 {
            return Err(ValidationError::invalid(
                "focus_secs",
                "focus duration must be at least one second",
            ));
        }
        if break_secs == 0 {
            return Err(ValidationError::invalid(
                "break_secs",
                "break duration must be at least one second",
            ));
        }
        Ok(Self {
            focus_secs,
            break_secs,
        })
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }

    pub fn of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_secs,
            Phase::Break => self.break_secs,
        }
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            break_secs: DEFAULT_BREAK_SECS,
        }
    }
}
