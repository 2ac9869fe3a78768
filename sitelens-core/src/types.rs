//! Core domain types for sitelens
//!
//! The engine operates on a read-only snapshot of tracked events supplied
//! per invocation by the ingestion collaborator. Everything else the
//! dashboard shows is derived from these records at render time.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | One recorded visitor interaction: type, timestamp, open payload |
//! | **Session** | A reconstructed, time-ordered sequence of one visitor's events |
//! | **Time Frame** | A relative look-back window label (`1h`, `24h`, `7d`, `30d`) |
//! | **Widget** | One dashboard tile; its persisted configuration selects an analysis |
//! | **Suggestion** | A proposed widget emitted by the insight detectors |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event type recorded for plain page navigations.
pub const EVENT_TYPE_PAGEVIEW: &str = "pageview";

/// A single tracked event.
///
/// Events are produced by the ingestion collaborator and are read-only to
/// the engine. The payload is an open mapping; the conventional keys are
/// `path`, `referrer`, `session_id`, `user_id` and `ip`, plus event-specific
/// fields (e.g. `revenue` on a purchase event).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier assigned at ingestion
    pub id: String,
    /// When the event was recorded
    pub created_at: DateTime<Utc>,
    /// Event type tag: "pageview", "button", "purchase", ...
    #[serde(rename = "type")]
    pub event_type: String,
    /// Open payload - complete original record, never trimmed
    pub payload: serde_json::Value,
}

impl Event {
    /// Look up a payload property by key.
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.payload.get(key)
    }

    /// Look up a payload property as a string slice.
    ///
    /// Returns `None` for missing keys, non-string values, and empty strings;
    /// an empty tracker field carries no more information than an absent one.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// The page path this event was recorded on, if any.
    pub fn path(&self) -> Option<&str> {
        self.str_property("path")
    }

    /// The raw (unnormalized) referrer, if any.
    pub fn referrer(&self) -> Option<&str> {
        self.str_property("referrer")
    }

    /// Explicit session identifier from the tracker, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.str_property("session_id")
    }

    /// Authenticated user identifier, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.str_property("user_id")
    }

    /// Client IP captured at ingestion, if any.
    pub fn ip(&self) -> Option<&str> {
        self.str_property("ip")
    }

    /// Check whether this is a plain page navigation.
    pub fn is_pageview(&self) -> bool {
        self.event_type == EVENT_TYPE_PAGEVIEW
    }
}
