//! Not-found traffic detector.
//!
//! Fires when sessions in the last week kept landing on not-found pages;
//! the suggested traceback widget shows where those visitors came from so
//! the broken links can be fixed.

use crate::insights::engine::{InsightContext, InsightDetector, Suggestion};
use crate::traceback::{self, TracebackTarget};
use crate::widget::{WidgetConfig, WidgetKind};
use crate::window::TimeFrame;

pub struct NotFoundTraffic;

impl NotFoundTraffic {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NotFoundTraffic {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightDetector for NotFoundTraffic {
    fn name(&self) -> &str {
        "page.not_found"
    }

    fn detect(&self, ctx: &InsightContext) -> Option<Suggestion> {
        let report = traceback::analyze(
            ctx.events,
            &TracebackTarget::NotFound,
            ctx.analytics.traceback_depth,
            TimeFrame::Week,
            ctx.now,
        )
        .ok()?;

        if report.target_hits < ctx.insights.not_found_min_hits {
            return None;
        }

        let mut config = WidgetConfig::new(WidgetKind::Traceback, TimeFrame::Week);
        config.track_not_found = true;
        config.max_depth = Some(ctx.analytics.traceback_depth);

        Some(Suggestion::new(
            self.name(),
            format!(
                "Visitors hit missing pages {} times this week",
                report.target_hits
            ),
            config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyticsConfig, InsightsConfig};
    use crate::types::Event;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_visit(id: usize, at: DateTime<Utc>, session: &str, path: &str) -> Event {
        Event {
            id: format!("e-{}", id),
            created_at: at,
            event_type: "pageview".to_string(),
            payload: json!({ "session_id": session, "path": path }),
        }
    }

    fn detect(events: &[Event]) -> Option<Suggestion> {
        let insights = InsightsConfig::default();
        let analytics = AnalyticsConfig::default();
        let ctx = InsightContext {
            events,
            now: fixed_now(),
            insights: &insights,
            analytics: &analytics,
        };
        NotFoundTraffic::new().detect(&ctx)
    }

    #[test]
    fn test_fires_on_repeated_not_found_hits() {
        let now = fixed_now();
        let mut events = Vec::new();
        for i in 0..5 {
            let session = format!("s-{}", i);
            events.push(make_visit(i * 2, now, &session, "/docs"));
            events.push(make_visit(
                i * 2 + 1,
                now + Duration::seconds(1),
                &session,
                "/docs/old-page-404",
            ));
        }

        let suggestion = detect(&events).unwrap();
        assert_eq!(suggestion.config.kind, WidgetKind::Traceback);
        assert!(suggestion.config.track_not_found);
        assert_eq!(suggestion.config.max_depth, Some(3));
    }

    #[test]
    fn test_quiet_below_threshold() {
        let now = fixed_now();
        let events = vec![
            make_visit(0, now, "s-1", "/docs"),
            make_visit(1, now + Duration::seconds(1), "s-1", "/404"),
        ];
        assert!(detect(&events).is_none());
    }

    #[test]
    fn test_quiet_without_not_found_pages() {
        let now = fixed_now();
        let events: Vec<Event> = (0..20)
            .map(|i| make_visit(i, now, &format!("s-{}", i), "/fine"))
            .collect();
        assert!(detect(&events).is_none());
    }
}
