//! Stateless aggregators over a time-filtered event collection.
//!
//! All three aggregators are deterministic, total functions: the empty
//! collection yields zero counts and empty lists, never an error. Events
//! without session identity participate here even though session-scoped
//! analyses exclude them.

use crate::types::Event;
use crate::window::{self, TimeFrame};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Sentinel referrer for events with no referrer at all.
pub const DIRECT_REFERRER: &str = "Direct";

/// Default length of the top-referrers list.
pub const DEFAULT_REFERRER_LIMIT: usize = 5;

/// One row of the ranked referrer table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferrerEntry {
    /// Normalized referrer (host, sentinel, or verbatim passthrough)
    pub referrer: String,
    /// Events attributed to this referrer in the window
    pub count: u64,
    /// Share of all events in the window, 0-100
    pub percentage: f64,
}

/// Number of events inside the window.
pub fn event_count(events: &[Event], frame: TimeFrame, now: DateTime<Utc>) -> usize {
    window::filter_events(events, frame, now).len()
}

/// Number of distinct page paths inside the window.
pub fn unique_pages(events: &[Event], frame: TimeFrame, now: DateTime<Utc>) -> usize {
    window::filter_events(events, frame, now)
        .iter()
        .filter_map(|e| e.path())
        .collect::<HashSet<_>>()
        .len()
}

/// Normalize a raw referrer value for grouping.
///
/// - absent referrer: the `Direct` sentinel
/// - parseable URL with a host: the host, one leading `www.` stripped
/// - anything else: verbatim passthrough, so malformed tracker data stays
///   visible instead of vanishing into a parse error
pub fn normalize_referrer(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return DIRECT_REFERRER.to_string();
    };

    match url::Url::parse(raw) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Rank referrers inside the window, descending by count.
///
/// Ties keep first-seen order; the list is truncated to `limit`.
/// Percentages are relative to all events in the window, so they are stable
/// under truncation.
pub fn top_referrers(
    events: &[Event],
    frame: TimeFrame,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ReferrerEntry> {
    let filtered = window::filter_events(events, frame, now);
    let total = filtered.len() as u64;
    if total == 0 {
        return Vec::new();
    }

    // (count, first-seen index) per normalized referrer
    let mut tallies: HashMap<String, (u64, usize)> = HashMap::new();
    for (index, event) in filtered.iter().enumerate() {
        let referrer = normalize_referrer(event.referrer());
        let entry = tallies.entry(referrer).or_insert((0, index));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, u64, usize)> = tallies
        .into_iter()
        .map(|(referrer, (count, first_seen))| (referrer, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(referrer, count, _)| ReferrerEntry {
            referrer,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn make_event(id: &str, at: DateTime<Utc>, payload: serde_json::Value) -> Event {
        Event {
            id: id.to_string(),
            created_at: at,
            event_type: "pageview".to_string(),
            payload,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_empty_collection() {
        let now = fixed_now();
        assert_eq!(event_count(&[], TimeFrame::Day, now), 0);
        assert_eq!(unique_pages(&[], TimeFrame::Day, now), 0);
        assert!(top_referrers(&[], TimeFrame::Day, now, 5).is_empty());
    }

    #[test]
    fn test_event_count_matches_filter() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now - Duration::minutes(5), json!({})),
            make_event("e2", now - Duration::hours(30), json!({})),
        ];
        assert_eq!(event_count(&events, TimeFrame::Day, now), 1);
        assert_eq!(event_count(&events, TimeFrame::Week, now), 2);
    }

    #[test]
    fn test_unique_pages_dedupes() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now, json!({ "path": "/a" })),
            make_event("e2", now, json!({ "path": "/a" })),
            make_event("e3", now, json!({ "path": "/b" })),
            make_event("e4", now, json!({})), // no path, not counted
        ];
        assert_eq!(unique_pages(&events, TimeFrame::Day, now), 2);
    }

    #[test]
    fn test_normalize_referrer() {
        assert_eq!(normalize_referrer(None), "Direct");
        assert_eq!(
            normalize_referrer(Some("https://www.google.com/search?q=x")),
            "google.com"
        );
        assert_eq!(
            normalize_referrer(Some("https://google.com/search")),
            "google.com"
        );
        assert_eq!(
            normalize_referrer(Some("https://news.ycombinator.com/item?id=1")),
            "news.ycombinator.com"
        );
        // Not a URL: verbatim passthrough
        assert_eq!(normalize_referrer(Some("not a url")), "not a url");
        // Parses but has no host: verbatim passthrough
        assert_eq!(
            normalize_referrer(Some("mailto:someone@example.com")),
            "mailto:someone@example.com"
        );
    }

    #[test]
    fn test_top_referrers_merges_www_variants() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now, json!({ "referrer": "https://www.google.com/a" })),
            make_event("e2", now, json!({ "referrer": "https://google.com/b" })),
            make_event("e3", now, json!({ "referrer": "https://bing.com/c" })),
            make_event("e4", now, json!({})),
        ];

        let ranked = top_referrers(&events, TimeFrame::Day, now, 5);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].referrer, "google.com");
        assert_eq!(ranked[0].count, 2);
        assert!((ranked[0].percentage - 50.0).abs() < f64::EPSILON);
        // bing.com and Direct tie at 1; bing.com was seen first
        assert_eq!(ranked[1].referrer, "bing.com");
        assert_eq!(ranked[2].referrer, "Direct");
    }

    #[test]
    fn test_top_referrers_truncates_to_limit() {
        let now = fixed_now();
        let events: Vec<Event> = (0..8)
            .map(|i| {
                make_event(
                    &format!("e{}", i),
                    now,
                    json!({ "referrer": format!("https://site{}.test/", i) }),
                )
            })
            .collect();

        let ranked = top_referrers(&events, TimeFrame::Day, now, 3);
        assert_eq!(ranked.len(), 3);
        // Percentages stay relative to the full window, not the truncation
        for entry in &ranked {
            assert!((entry.percentage - 12.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_idempotent_for_fixed_inputs() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now, json!({ "referrer": "https://a.test/" })),
            make_event("e2", now, json!({ "referrer": "https://b.test/" })),
            make_event("e3", now, json!({ "referrer": "https://a.test/" })),
        ];

        let first = top_referrers(&events, TimeFrame::Day, now, 5);
        let second = top_referrers(&events, TimeFrame::Day, now, 5);
        assert_eq!(first, second);
    }
}
