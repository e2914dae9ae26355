//! Terminal rendering of timer state.

use deepwork_core::storage::DisplayConfig;
use deepwork_core::{Phase, Snapshot};

pub fn status_line(snapshot: &Snapshot, display: &DisplayConfig) -> String {
    let mut line = format!("[{}] {}", snapshot.mode, snapshot.clock);
    line.push_str(if snapshot.running {
        "  running"
    } else {
        "  paused"
    });
    if display.show_progress {
        line.push_str(&format!("  {:5.1}%", snapshot.progress_pct));
    }
    line.push_str(&format!(
        "  sessions today: {}",
        snapshot.completed_focus_sessions
    ));
    if display.show_labels {
        line.push_str(&format!("  | {}", snapshot.mode.title()));
    }
    line
}

pub fn phase_banner(from: Phase, to: Phase) -> String {
    format!(
        "{} finished. {}: {}. Press s to start.",
        from,
        to.title(),
        to.subtitle()
    )
}

pub const HELP: &str = "commands: s/start  p/pause  t/toggle (or Enter)  r/reset  q/quit";
