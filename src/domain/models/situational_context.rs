use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-turn snapshot of when the conversation is happening.
///
/// Computed fresh for every turn and never stored.
#[derive(Debug, Clone, Copy)]
pub struct SituationalContext {
    now: DateTime<Local>,
    elapsed: Duration,
}

impl SituationalContext {
    pub fn new(now: DateTime<Local>, elapsed: Duration) -> Self {
        Self { now, elapsed }
    }

    pub fn capture(session_started: Instant) -> Self {
        Self::new(Local::now(), session_started.elapsed())
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.now.hour())
    }

    pub fn describe(&self) -> String {
        format!(
            "It is {} {} ({}). The conversation has been going on for {}.",
            self.now.format("%A"),
            self.time_of_day(),
            self.now.format("%H:%M"),
            humanize(self.elapsed)
        )
    }
}

fn humanize(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    match secs {
        0..=59 => "less than a minute".to_string(),
        60..=119 => "1 minute".to_string(),
        120..=3599 => format!("{} minutes", secs / 60),
        _ => {
            let hours = secs / 3600;
            let minutes = (secs % 3600) / 60;
            let unit = if hours == 1 { "hour" } else { "hours" };
            if minutes == 0 {
                format!("{hours} {unit}")
            } else {
                format!("{hours} {unit} {minutes} minutes")
            }
        }
    }
}
