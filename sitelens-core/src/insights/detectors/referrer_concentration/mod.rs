//! Referrer concentration detector.
//!
//! Fires when a single external referrer carries a large share of the last
//! week's traffic. Direct traffic dominating is the default state of most
//! sites and says nothing about acquisition, so the `Direct` sentinel is
//! skipped when looking for the dominant source.

use crate::aggregate::{self, DIRECT_REFERRER};
use crate::insights::engine::{InsightContext, InsightDetector, Suggestion};
use crate::widget::{WidgetConfig, WidgetKind};
use crate::window::TimeFrame;

pub struct ReferrerConcentration;

impl ReferrerConcentration {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReferrerConcentration {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightDetector for ReferrerConcentration {
    fn name(&self) -> &str {
        "referrer.concentration"
    }

    fn detect(&self, ctx: &InsightContext) -> Option<Suggestion> {
        let ranked = aggregate::top_referrers(
            ctx.events,
            TimeFrame::Week,
            ctx.now,
            ctx.analytics.top_referrers_limit,
        );

        let dominant = ranked.iter().find(|r| r.referrer != DIRECT_REFERRER)?;
        if dominant.percentage < ctx.insights.referrer_share_threshold {
            return None;
        }

        Some(Suggestion::new(
            self.name(),
            format!(
                "{} drives {:.0}% of your traffic this week",
                dominant.referrer, dominant.percentage
            ),
            WidgetConfig::new(WidgetKind::TopReferrers, TimeFrame::Week),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyticsConfig, InsightsConfig};
    use crate::types::Event;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_event(id: usize, at: DateTime<Utc>, referrer: Option<&str>) -> Event {
        let payload = match referrer {
            Some(r) => json!({ "path": "/", "referrer": r }),
            None => json!({ "path": "/" }),
        };
        Event {
            id: format!("e-{}", id),
            created_at: at,
            event_type: "pageview".to_string(),
            payload,
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
        ReferrerConcentration::new().detect(&ctx)
    }

    #[test]
    fn test_fires_on_dominant_external_referrer() {
        let now = fixed_now();
        let mut events: Vec<Event> = (0..6)
            .map(|i| make_event(i, now, Some("https://news.ycombinator.com/item")))
            .collect();
        events.extend((6..10).map(|i| make_event(i, now, None)));

        let suggestion = detect(&events).unwrap();
        assert_eq!(suggestion.config.kind, WidgetKind::TopReferrers);
        assert!(suggestion.title.starts_with("news.ycombinator.com"));
    }

    #[test]
    fn test_direct_dominance_is_ignored() {
        let now = fixed_now();
        // 9 direct, 1 external at 10%: no external concentration
        let mut events: Vec<Event> = (0..9).map(|i| make_event(i, now, None)).collect();
        events.push(make_event(9, now, Some("https://google.com/")));

        assert!(detect(&events).is_none());
    }

    #[test]
    fn test_quiet_on_empty_snapshot() {
        assert!(detect(&[]).is_none());
    }
}
