//! Reverse-path ("traceback") attribution.
//!
//! Answers "where were visitors right before they reached this page?" for
//! a single target page or a whole class of targets (any not-found page).
//! Sessions are rebuilt from the time-filtered event set rather than
//! filtered from a global session map: the window must bound which hits
//! count as the target as well as which earlier visits can be attributed,
//! otherwise stale history would leak into current-window statistics.

use crate::error::{Error, Result};
use crate::session::{self, SessionMap};
use crate::types::Event;
use crate::window::{self, TimeFrame};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default backward depth for traceback widgets.
pub const DEFAULT_MAX_DEPTH: i64 = 3;

/// What counts as "the target" for a traceback analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum TracebackTarget {
    /// One exact page path
    Page { path: String },
    /// Any not-found page: the path contains `404` or `not-found`,
    /// or ends with `not_found`
    NotFound,
}

impl TracebackTarget {
    /// Check whether a visited path satisfies this target.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            TracebackTarget::Page { path: target } => path == target,
            TracebackTarget::NotFound => {
                path.contains("404") || path.contains("not-found") || path.ends_with("not_found")
            }
        }
    }
}

/// One attributed source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracebackEntry {
    /// Page visited within `max_depth` steps before a target hit
    pub source_page: String,
    /// Depth-step visits attributed to this page
    pub count: u64,
    /// `count / target_hits * 100`
    pub percentage: f64,
}

/// Full traceback result for one target and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracebackReport {
    /// Attributed source pages, count descending then page ascending
    pub entries: Vec<TracebackEntry>,
    /// Target occurrences across all sessions in the window
    pub target_hits: u64,
}

/// Attribute the pages visited before each target hit.
///
/// Every target occurrence increments `target_hits` once; the backward
/// walk from it increments one source counter per depth step, so a single
/// hit can contribute to up to `max_depth` source pages. No target hits
/// yields an empty entry list, not an error.
pub fn analyze(
    events: &[Event],
    target: &TracebackTarget,
    max_depth: i64,
    frame: TimeFrame,
    now: DateTime<Utc>,
) -> Result<TracebackReport> {
    let windowed = window::filter_events(events, frame, now);
    let sessions = session::reconstruct(windowed.into_iter());
    analyze_sessions(&sessions, target, max_depth)
}

/// Variant of [`analyze`] over an already-windowed session map.
///
/// The map must have been built from time-filtered events (a
/// [`crate::session::SessionCache`] does this); handing in an unwindowed
/// map would leak stale history into the statistics.
pub fn analyze_sessions(
    sessions: &SessionMap<'_>,
    target: &TracebackTarget,
    max_depth: i64,
) -> Result<TracebackReport> {
    if max_depth < 1 {
        return Err(Error::InvalidDepth(max_depth));
    }
    let max_depth = max_depth as usize;
    let mut target_hits: u64 = 0;
    let mut sources: HashMap<String, u64> = HashMap::new();

    for (_, path_sequence) in sessions.path_sequences() {
        for (index, page) in path_sequence.iter().enumerate() {
            if !target.matches(page) {
                continue;
            }
            target_hits += 1;

            let steps_back = index.min(max_depth);
            for offset in 1..=steps_back {
                let source = path_sequence[index - offset];
                *sources.entry(source.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut entries: Vec<TracebackEntry> = sources
        .into_iter()
        .map(|(source_page, count)| TracebackEntry {
            percentage: count as f64 / target_hits as f64 * 100.0,
            source_page,
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.source_page.cmp(&b.source_page)));

    tracing::debug!(
        target_hits,
        sources = entries.len(),
        "Traceback analysis complete"
    );

    Ok(TracebackReport {
        entries,
        target_hits,
    })
}
