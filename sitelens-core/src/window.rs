//! Relative time windows.
//!
//! Every window-sensitive computation takes the current instant as an
//! explicit argument; re-running the same computation one second later
//! shifts the window. There is deliberately no "all time" frame, and an
//! unknown label is a parse error rather than a silent widening of scope.

use crate::types::Event;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A relative look-back window, anchored to the moment of computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    /// Last hour
    #[serde(rename = "1h")]
    Hour,
    /// Last 24 hours
    #[serde(rename = "24h")]
    Day,
    /// Last 7 days
    #[serde(rename = "7d")]
    Week,
    /// Last 30 days
    #[serde(rename = "30d")]
    Month,
}

/// All frames, narrowest first.
pub const ALL_FRAMES: [TimeFrame; 4] = [
    TimeFrame::Hour,
    TimeFrame::Day,
    TimeFrame::Week,
    TimeFrame::Month,
];

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Hour => "1h",
            TimeFrame::Day => "24h",
            TimeFrame::Week => "7d",
            TimeFrame::Month => "30d",
        }
    }

    /// The length of this window.
    pub fn duration(&self) -> Duration {
        match self {
            TimeFrame::Hour => Duration::hours(1),
            TimeFrame::Day => Duration::hours(24),
            TimeFrame::Week => Duration::days(7),
            TimeFrame::Month => Duration::days(30),
        }
    }

    /// The oldest instant still inside the window, given "now".
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeFrame {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeFrame::Hour),
            "24h" => Ok(TimeFrame::Day),
            "7d" => Ok(TimeFrame::Week),
            "30d" => Ok(TimeFrame::Month),
            _ => Err(crate::error::Error::UnknownTimeFrame(s.to_string())),
        }
    }
}

/// Reduce an event collection to those inside the window.
///
/// Pure function of its three inputs. Preserves input order; empty input
/// yields empty output.
pub fn filter_events<'a>(
    events: &'a [Event],
    frame: TimeFrame,
    now: DateTime<Utc>,
) -> Vec<&'a Event> {
    let cutoff = frame.cutoff(now);
    events.iter().filter(|e| e.created_at >= cutoff).collect()
}
