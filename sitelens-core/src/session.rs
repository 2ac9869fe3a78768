//! Session reconstruction.
//!
//! The tracker does not guarantee a session identifier on every event, so
//! sessions are reconstructed with a layered heuristic, in priority order:
//!
//! 1. `payload.session_id` - explicit tracker session
//! 2. `payload.user_id` - authenticated visitor
//! 3. `payload.ip` + the event's UTC calendar day - synthetic fallback
//!
//! The fallback is approximate by design: one visitor behind a shared IP is
//! indistinguishable from several. Each reconstructed session therefore
//! carries an [`IdentitySource`] tag so consumers can tell an explicit
//! session from a reconstructed one. Events with none of the three fields
//! are excluded from session-scoped analyses and surfaced via the
//! `unattributable` count; they still participate in plain aggregates.

use crate::types::Event;
use crate::window::{self, TimeFrame};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How a session's identity was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// Explicit `session_id` from the tracker
    Explicit,
    /// `user_id` of an authenticated visitor
    UserId,
    /// Synthetic key: client IP plus UTC calendar day
    IpDay,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::Explicit => "explicit",
            IdentitySource::UserId => "user_id",
            IdentitySource::IpDay => "ip_day",
        }
    }
}

/// Derived identifier of one reconstructed session.
///
/// The source participates in ordering so a `user_id` that happens to
/// collide with an explicit session id still forms a distinct session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// Resolved identity value
    pub value: String,
    /// Which fallback layer produced the value
    pub source: IdentitySource,
}

impl SessionKey {
    /// Resolve the session key for a single event, if it has one.
    pub fn for_event(event: &Event) -> Option<SessionKey> {
        if let Some(id) = event.session_id() {
            return Some(SessionKey {
                value: id.to_string(),
                source: IdentitySource::Explicit,
            });
        }
        if let Some(user) = event.user_id() {
            return Some(SessionKey {
                value: user.to_string(),
                source: IdentitySource::UserId,
            });
        }
        event.ip().map(|ip| SessionKey {
            value: format!("{}|{}", ip, event.created_at.date_naive()),
            source: IdentitySource::IpDay,
        })
    }
}

/// Sessions reconstructed from one event snapshot.
///
/// A `BTreeMap` keeps iteration order deterministic, which makes every
/// downstream analysis byte-stable for identical inputs.
#[derive(Debug, Default)]
pub struct SessionMap<'a> {
    /// Session key to chronologically sorted events
    pub sessions: BTreeMap<SessionKey, Vec<&'a Event>>,
    /// Events lacking all three identity fields, excluded from the map
    pub unattributable: usize,
}

impl<'a> SessionMap<'a> {
    /// Number of reconstructed sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Page paths visited by one session, in chronological order.
    ///
    /// Every event carrying a `path` joins the sequence regardless of its
    /// type: the tracker stamps the current page on custom events too, and
    /// those mark presence on a page just as a pageview does.
    pub fn path_sequence(events: &[&'a Event]) -> Vec<&'a str> {
        events.iter().filter_map(|e| e.path()).collect()
    }

    /// Iterate over `(key, path sequence)` for every session.
    pub fn path_sequences(&self) -> impl Iterator<Item = (&SessionKey, Vec<&'a str>)> {
        self.sessions
            .iter()
            .map(|(key, events)| (key, Self::path_sequence(events)))
    }
}

/// Group a flat event list into per-visitor sessions.
///
/// Events within a session are sorted by `created_at`; the sort is stable,
/// so events sharing a timestamp keep their original order (flow analysis
/// depends on this).
pub fn reconstruct<'a, I>(events: I) -> SessionMap<'a>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut map = SessionMap::default();

    for event in events {
        match SessionKey::for_event(event) {
            Some(key) => map.sessions.entry(key).or_default().push(event),
            None => map.unattributable += 1,
        }
    }

    for events in map.sessions.values_mut() {
        events.sort_by_key(|e| e.created_at);
    }

    if map.unattributable > 0 {
        tracing::debug!(
            unattributable = map.unattributable,
            sessions = map.sessions.len(),
            "Excluded events without session identity"
        );
    }

    map
}

/// Memoized session maps for a single render pass.
///
/// Each dashboard widget independently needs sessions over its own time
/// frame; rebuilding them per widget over the same snapshot is pure waste.
/// The cache is scoped to one snapshot and one "now" and is invalidated by
/// dropping it, never shared across passes.
pub struct SessionCache<'a> {
    events: &'a [Event],
    now: DateTime<Utc>,
    full: Option<SessionMap<'a>>,
    by_frame: HashMap<TimeFrame, SessionMap<'a>>,
}

impl<'a> SessionCache<'a> {
    /// Create a cache over one event snapshot, anchored at `now`.
    pub fn new(events: &'a [Event], now: DateTime<Utc>) -> Self {
        Self {
            events,
            now,
            full: None,
            by_frame: HashMap::new(),
        }
    }

    /// The instant this pass is anchored to.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The underlying event snapshot.
    pub fn events(&self) -> &'a [Event] {
        self.events
    }

    /// Sessions over the whole snapshot.
    pub fn sessions(&mut self) -> &SessionMap<'a> {
        let events = self.events;
        self.full.get_or_insert_with(|| reconstruct(events))
    }

    /// Sessions rebuilt from the events inside `frame`.
    ///
    /// Rebuilt rather than filtered from the full map: the window must
    /// bound which events can be attributed at all, and an ip+day key can
    /// even differ once out-of-window days are gone.
    pub fn sessions_within(&mut self, frame: TimeFrame) -> &SessionMap<'a> {
        let events = self.events;
        let now = self.now;
        self.by_frame.entry(frame).or_insert_with(|| {
            reconstruct(window::filter_events(events, frame, now).into_iter())
        })
    }
}
