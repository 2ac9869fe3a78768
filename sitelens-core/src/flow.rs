//! Funnel/flow analysis between configured pages.
//!
//! For an ordered page list like `["/", "/pricing", "/signup"]` the
//! analyzer produces one [`FlowStep`] per adjacent pair, answering "of the
//! sessions that were on `from`, what came immediately next?" A page
//! occurring several times in one session is tallied once per occurrence;
//! the question recurs with the page, so deduplicating would understate
//! the denominator.

use crate::session::SessionMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum number of configured pages for a flow widget.
pub const MIN_FLOW_PAGES: usize = 2;
/// Maximum number of configured pages for a flow widget.
pub const MAX_FLOW_PAGES: usize = 4;

/// How many alternate next-pages are kept per step.
const ALTERNATIVE_LIMIT: usize = 2;

/// A next-page that was visited instead of the configured target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAlternative {
    /// The page actually visited next
    pub page: String,
    /// Occurrences of this detour
    pub count: u64,
    /// Share of all visits to the step's `from` page, 0-100
    pub percentage: f64,
}

/// Measured transition between two configured pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStep {
    pub from_page: String,
    pub to_page: String,
    /// Direct `from -> to` transitions
    pub count: u64,
    /// All visits to `from` followed by any next page
    pub total: u64,
    /// `count / total * 100`, 0 when `total` is 0
    pub percentage: f64,
    /// Top detours, ranked descending, at most two
    pub alternatives: Vec<FlowAlternative>,
}

/// Compute one [`FlowStep`] per adjacent pair of `pages`.
///
/// Fewer than [`MIN_FLOW_PAGES`] configured pages yields an empty result;
/// that is a configuration gap for the widget layer to surface, not an
/// error here. The analyzer itself is total over any page list so the
/// boundary can be probed directly.
pub fn analyze(sessions: &SessionMap<'_>, pages: &[String]) -> Vec<FlowStep> {
    if pages.len() < MIN_FLOW_PAGES {
        return Vec::new();
    }

    struct PairTally {
        count: u64,
        total: u64,
        // page -> (count, first-seen order)
        others: HashMap<String, (u64, usize)>,
    }

    let mut tallies: Vec<PairTally> = pages
        .windows(2)
        .map(|_| PairTally {
            count: 0,
            total: 0,
            others: HashMap::new(),
        })
        .collect();

    for (_, path_sequence) in sessions.path_sequences() {
        for visit in path_sequence.windows(2) {
            let (visited, next) = (visit[0], visit[1]);
            for (pair_index, pair) in pages.windows(2).enumerate() {
                if visited != pair[0] {
                    continue;
                }
                let tally = &mut tallies[pair_index];
                tally.total += 1;
                if next == pair[1] {
                    tally.count += 1;
                } else {
                    let order = tally.others.len();
                    let entry = tally.others.entry(next.to_string()).or_insert((0, order));
                    entry.0 += 1;
                }
            }
        }
    }

    pages
        .windows(2)
        .zip(tallies)
        .map(|(pair, tally)| {
            let mut others: Vec<(String, u64, usize)> = tally
                .others
                .into_iter()
                .map(|(page, (count, order))| (page, count, order))
                .collect();
            others.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
            others.truncate(ALTERNATIVE_LIMIT);

            let alternatives = others
                .into_iter()
                .map(|(page, count, _)| FlowAlternative {
                    page,
                    count,
                    percentage: step_percentage(count, tally.total),
                })
                .collect();

            FlowStep {
                from_page: pair[0].clone(),
                to_page: pair[1].clone(),
                count: tally.count,
                total: tally.total,
                percentage: step_percentage(tally.count, tally.total),
                alternatives,
            }
        })
        .collect()
}

fn step_percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::reconstruct;
    use crate::types::Event;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    fn make_event(id: &str, at: DateTime<Utc>, session: &str, path: &str) -> Event {
        Event {
            id: id.to_string(),
            created_at: at,
            event_type: "pageview".to_string(),
            payload: json!({ "session_id": session, "path": path }),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn pages(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_direct_transition() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now, "s-1", "/a"),
            make_event("e2", now + Duration::seconds(1), "s-1", "/b"),
        ];
        let sessions = reconstruct(events.iter());

        let steps = analyze(&sessions, &pages(&["/a", "/b"]));
        assert_eq!(steps.len(), 1);
        let step = &steps[0];
        assert_eq!(step.count, 1);
        assert_eq!(step.total, 1);
        assert!((step.percentage - 100.0).abs() < f64::EPSILON);
        assert!(step.alternatives.is_empty());
    }

    #[test]
    fn test_detour_becomes_alternative() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now, "s-1", "/a"),
            make_event("e2", now + Duration::seconds(1), "s-1", "/c"),
        ];
        let sessions = reconstruct(events.iter());

        let steps = analyze(&sessions, &pages(&["/a", "/b"]));
        let step = &steps[0];
        assert_eq!(step.count, 0);
        assert_eq!(step.total, 1);
        assert_eq!(step.percentage, 0.0);
        assert_eq!(
            step.alternatives,
            vec![FlowAlternative {
                page: "/c".to_string(),
                count: 1,
                percentage: 100.0,
            }]
        );
    }

    #[test]
    fn test_alternatives_ranked_and_capped_at_two() {
        let now = fixed_now();
        let mut events = Vec::new();
        // 2x /a -> /x, 2x /a -> /y, 1x /a -> /z, 1x /a -> /b
        let detours = ["/x", "/x", "/y", "/y", "/z", "/b"];
        for (i, next) in detours.iter().enumerate() {
            let session = format!("s-{}", i);
            let base = now + Duration::seconds(i as i64 * 10);
            events.push(make_event(&format!("a{}", i), base, &session, "/a"));
            events.push(make_event(
                &format!("n{}", i),
                base + Duration::seconds(1),
                &session,
                next,
            ));
        }
        let sessions = reconstruct(events.iter());

        let steps = analyze(&sessions, &pages(&["/a", "/b"]));
        let step = &steps[0];
        assert_eq!(step.total, 6);
        assert_eq!(step.count, 1);
        assert_eq!(step.alternatives.len(), 2);
        assert_eq!(step.alternatives[0].page, "/x");
        assert_eq!(step.alternatives[0].count, 2);
        assert_eq!(step.alternatives[1].page, "/y");
        // Invariant: count + sum(alternatives) <= total
        let alt_sum: u64 = step.alternatives.iter().map(|a| a.count).sum();
        assert!(step.count + alt_sum <= step.total);
    }

    #[test]
    fn test_repeat_visits_tally_per_occurrence() {
        let now = fixed_now();
        // One session bouncing: /a -> /b -> /a -> /c
        let events = vec![
            make_event("e1", now, "s-1", "/a"),
            make_event("e2", now + Duration::seconds(1), "s-1", "/b"),
            make_event("e3", now + Duration::seconds(2), "s-1", "/a"),
            make_event("e4", now + Duration::seconds(3), "s-1", "/c"),
        ];
        let sessions = reconstruct(events.iter());

        let steps = analyze(&sessions, &pages(&["/a", "/b"]));
        let step = &steps[0];
        assert_eq!(step.total, 2, "both /a occurrences count");
        assert_eq!(step.count, 1);
        assert!((step.percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multi_step_page_list() {
        let now = fixed_now();
        let events = vec![
            make_event("e1", now, "s-1", "/a"),
            make_event("e2", now + Duration::seconds(1), "s-1", "/b"),
            make_event("e3", now + Duration::seconds(2), "s-1", "/c"),
        ];
        let sessions = reconstruct(events.iter());

        let steps = analyze(&sessions, &pages(&["/a", "/b", "/c"]));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].from_page, "/a");
        assert_eq!(steps[0].to_page, "/b");
        assert_eq!(steps[1].from_page, "/b");
        assert_eq!(steps[1].to_page, "/c");
        assert_eq!(steps[1].count, 1);
    }

    #[test]
    fn test_too_few_pages_yields_no_steps() {
        let sessions = reconstruct(std::iter::empty());
        assert!(analyze(&sessions, &pages(&["/a"])).is_empty());
        assert!(analyze(&sessions, &[]).is_empty());
    }

    #[test]
    fn test_empty_sessions_yield_zeroed_steps() {
        let sessions = reconstruct(std::iter::empty());
        let steps = analyze(&sessions, &pages(&["/a", "/b"]));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].total, 0);
        assert_eq!(steps[0].percentage, 0.0);
    }
}
