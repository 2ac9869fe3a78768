//! Dashboard header statistics.
//!
//! Aggregate numbers for the overview strip above the widget grid.
//! Derived entirely from the window filter, the aggregators, and one
//! session reconstruction; recomputed on every render like everything
//! else.

use crate::aggregate::{self, ReferrerEntry};
use crate::session;
use crate::types::Event;
use crate::window::TimeFrame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overview statistics for the dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    // Event totals per frame
    /// Events in the last hour
    pub events_last_hour: usize,
    /// Events in the last 24 hours
    pub events_last_day: usize,
    /// Events in the last 7 days
    pub events_last_week: usize,
    /// Events in the last 30 days
    pub events_last_month: usize,

    /// Distinct pages visited in the last 30 days
    pub unique_pages: usize,
    /// Reconstructed sessions in the last 30 days
    pub session_count: usize,
    /// Events with no usable session identity in the last 30 days
    pub unattributable_events: usize,

    /// Ranked referrers over the last 30 days
    pub top_referrers: Vec<ReferrerEntry>,
}

impl DashboardStats {
    /// Compute the overview for one snapshot.
    pub fn compute(events: &[Event], now: DateTime<Utc>, referrer_limit: usize) -> Self {
        let mut cache = session::SessionCache::new(events, now);
        let month_sessions = cache.sessions_within(TimeFrame::Month);

        Self {
            events_last_hour: aggregate::event_count(events, TimeFrame::Hour, now),
            events_last_day: aggregate::event_count(events, TimeFrame::Day, now),
            events_last_week: aggregate::event_count(events, TimeFrame::Week, now),
            events_last_month: aggregate::event_count(events, TimeFrame::Month, now),
            unique_pages: aggregate::unique_pages(events, TimeFrame::Month, now),
            session_count: month_sessions.len(),
            unattributable_events: month_sessions.unattributable,
            top_referrers: aggregate::top_referrers(events, TimeFrame::Month, now, referrer_limit),
        }
    }
}
