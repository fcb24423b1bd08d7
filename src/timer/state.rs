use serde::{Deserialize, Serialize};

pub const POMODORO_SECS: u32 = 25 * 60;
pub const SHORT_BREAK_SECS: u32 = 5 * 60;
pub const LONG_BREAK_SECS: u32 = 15 * 60;
pub const DISCONNECTION_SECS: u32 = 2 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FocusMode {
    Idle,
    Pomodoro,
    Break,
    Disconnection,
}

impl Default for FocusMode {
    fn default() -> Self {
        FocusMode::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BreakLength {
    Short,
    Long,
}

impl BreakLength {
    pub fn secs(self) -> u32 {
        match self {
            BreakLength::Short => SHORT_BREAK_SECS,
            BreakLength::Long => LONG_BREAK_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was inactive or already finished; nothing moved.
    Skipped,
    Ticked,
    Completed,
}

/// Countdown shared by every timed mode. One `tick()` per elapsed second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTimer {
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub is_active: bool,
    #[serde(skip)]
    completed: bool,
}

impl SessionTimer {
    pub fn new(duration_secs: u32, autostart: bool) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            is_active: autostart,
            completed: false,
        }
    }

    /// Always derived from remaining/duration; a zero-length timer reads 0%,
    /// not NaN.
    pub fn progress_percent(&self) -> f64 {
        if self.duration_secs == 0 {
            0.0
        } else {
            self.remaining_secs as f64 / self.duration_secs as f64 * 100.0
        }
    }

    pub fn start(&mut self) {
        self.is_active = true;
    }

    pub fn pause(&mut self) {
        self.is_active = false;
    }

    pub fn toggle(&mut self) {
        self.is_active = !self.is_active;
    }

    /// Rewind to a (possibly new) full duration. Leaves `is_active` alone;
    /// callers decide whether a reset also restarts.
    pub fn reset(&mut self, duration_secs: u32) {
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.completed = false;
    }

    /// Advance one second of wall-clock time. `Completed` is returned exactly
    /// once per countdown; the timer must be `reset` before it can complete
    /// again.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active || self.completed {
            return TickOutcome::Skipped;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.completed = true;
            self.is_active = false;
            TickOutcome::Completed
        } else {
            TickOutcome::Ticked
        }
    }
}

/// `MM:SS`, zero padded. Minutes grow unbounded for very long durations.
pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
