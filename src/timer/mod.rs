pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{FocusController, FocusSnapshot};
pub use state::{
    format_countdown, BreakLength, FocusMode, SessionTimer, TickOutcome, DISCONNECTION_SECS,
    LONG_BREAK_SECS, POMODORO_SECS, SHORT_BREAK_SECS,
};
