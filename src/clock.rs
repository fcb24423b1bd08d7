use chrono::{DateTime, Local, Timelike};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClockInfo {
    pub time: String,
    pub greeting: String,
}

pub fn greeting_for_hour(hour: u32) -> &'static str {
    if (5..12).contains(&hour) {
        "Good morning."
    } else if (12..18).contains(&hour) {
        "Good afternoon."
    } else {
        "Good evening."
    }
}

pub fn format_wall_clock<Tz: chrono::TimeZone>(time: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

pub fn current() -> ClockInfo {
    let now = Local::now();
    ClockInfo {
        time: format_wall_clock(&now),
        greeting: greeting_for_hour(now.hour()).to_string(),
    }
}
