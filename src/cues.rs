//! Terminal cue player.

use std::io::Write;

use guess_weather_core::{Cue, CuePlayer};
use tracing::{debug, instrument};

/// Rings the terminal bell for bad news and logs every cue.
#[derive(Debug, Clone, Copy)]
pub struct TerminalCues {
    bell: bool,
}

impl TerminalCues {
    /// Creates a cue player; with `bell` off it only logs.
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    /// True if this cue rings the bell.
    pub fn rings_for(&self, cue: Cue) -> bool {
        self.bell && matches!(cue, Cue::Wrong | Cue::Lose)
    }
}

impl CuePlayer for TerminalCues {
    #[instrument(skip(self))]
    fn play_cue(&self, cue: Cue) {
        debug!(%cue, "Playing cue");
        if self.rings_for(cue) {
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(b"\x07").and_then(|_| stderr.flush());
        }
    }
}
