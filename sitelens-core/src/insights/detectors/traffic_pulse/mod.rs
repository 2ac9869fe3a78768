//! Traffic pulse detector.
//!
//! Fires when the last 24 hours carried enough events that the site owner
//! plausibly wants a volume widget on the dashboard.

use crate::aggregate;
use crate::insights::engine::{InsightContext, InsightDetector, Suggestion};
use crate::widget::{WidgetConfig, WidgetKind};
use crate::window::TimeFrame;

pub struct TrafficPulse;

impl TrafficPulse {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrafficPulse {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightDetector for TrafficPulse {
    fn name(&self) -> &str {
        "traffic.pulse"
    }

    fn detect(&self, ctx: &InsightContext) -> Option<Suggestion> {
        let count = aggregate::event_count(ctx.events, TimeFrame::Day, ctx.now) as u64;
        if count < ctx.insights.traffic_pulse_min_events {
            return None;
        }

        Some(Suggestion::new(
            self.name(),
            format!("Your site recorded {} events in the last 24 hours", count),
            WidgetConfig::new(WidgetKind::EventCount, TimeFrame::Day),
        ))
    }
}
