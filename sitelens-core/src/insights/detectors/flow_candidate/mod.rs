//! Flow candidate detector.
//!
//! Finds the most frequent direct page-to-page transition in the last 30
//! days and, when it happens often enough, suggests a flow widget seeded
//! with that pair so the user can start watching the funnel around it.

use crate::insights::engine::{InsightContext, InsightDetector, Suggestion};
use crate::session;
use crate::widget::{WidgetConfig, WidgetKind};
use crate::window::{self, TimeFrame};
use std::collections::HashMap;

pub struct FlowCandidate;

impl FlowCandidate {
    pub fn new() -> Self {
        Self
    }

    /// The most frequent `from != to` transition, with its count.
    ///
    /// Ties resolve to the lexicographically smallest pair so the result
    /// is stable for identical snapshots.
    fn dominant_transition(ctx: &InsightContext) -> Option<(String, String, u64)> {
        let windowed = window::filter_events(ctx.events, TimeFrame::Month, ctx.now);
        let sessions = session::reconstruct(windowed.into_iter());

        let mut transitions: HashMap<(String, String), u64> = HashMap::new();
        for (_, path_sequence) in sessions.path_sequences() {
            for visit in path_sequence.windows(2) {
                if visit[0] == visit[1] {
                    continue;
                }
                *transitions
                    .entry((visit[0].to_string(), visit[1].to_string()))
                    .or_insert(0) += 1;
            }
        }

        transitions
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|((from, to), count)| (from, to, count))
    }
}

impl Default for FlowCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightDetector for FlowCandidate {
    fn name(&self) -> &str {
        "flow.candidate"
    }

    fn detect(&self, ctx: &InsightContext) -> Option<Suggestion> {
        let (from, to, count) = Self::dominant_transition(ctx)?;
        if count < ctx.insights.flow_min_transitions {
            return None;
        }

        let mut config = WidgetConfig::new(WidgetKind::Flow, TimeFrame::Month);
        config.flow_pages = vec![from.clone(), to.clone()];

        Some(Suggestion::new(
            self.name(),
            format!("Visitors moved {} -> {} {} times this month", from, to, count),
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

    fn transition(events: &mut Vec<Event>, session: &str, at: DateTime<Utc>, from: &str, to: &str) {
        for (offset, path) in [(0, from), (1, to)] {
            events.push(Event {
                id: format!("e-{}", events.len()),
                created_at: at + Duration::seconds(offset),
                event_type: "pageview".to_string(),
                payload: json!({ "session_id": session, "path": path }),
            });
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
        FlowCandidate::new().detect(&ctx)
    }

    #[test]
    fn test_fires_on_frequent_transition() {
        let now = fixed_now();
        let mut events = Vec::new();
        for i in 0..10 {
            transition(
                &mut events,
                &format!("s-{}", i),
                now - Duration::minutes(i),
                "/",
                "/pricing",
            );
        }
        // A quieter competing transition
        transition(&mut events, "s-x", now, "/pricing", "/signup");

        let suggestion = detect(&events).unwrap();
        assert_eq!(suggestion.config.kind, WidgetKind::Flow);
        assert_eq!(
            suggestion.config.flow_pages,
            vec!["/".to_string(), "/pricing".to_string()]
        );
    }

    #[test]
    fn test_quiet_below_threshold() {
        let now = fixed_now();
        let mut events = Vec::new();
        for i in 0..3 {
            transition(
                &mut events,
                &format!("s-{}", i),
                now - Duration::minutes(i),
                "/",
                "/pricing",
            );
        }
        assert!(detect(&events).is_none());
    }

    #[test]
    fn test_self_transitions_are_ignored() {
        let now = fixed_now();
        let mut events = Vec::new();
        for i in 0..20 {
            transition(
                &mut events,
                &format!("s-{}", i),
                now - Duration::minutes(i),
                "/a",
                "/a",
            );
        }
        assert!(detect(&events).is_none());
    }
}
