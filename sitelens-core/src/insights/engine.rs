//! Insight detector framework
//!
//! Detectors consume the event snapshot and produce suggested widget
//! definitions. They must be:
//! - **Deterministic**: same snapshot, same "now", same suggestions
//! - **Independent**: no detector sees another's output
//! - **Quiet by default**: `None` when the pattern is absent, not a
//!   zero-valued suggestion
//!
//! The engine owns filtering: a suggestion is dropped when its widget kind
//! already sits on the dashboard or when the user archived its id earlier.
//! Ids are content hashes, so an archived suggestion stays archived across
//! re-generation for as long as its configuration would be the same.

use crate::config::{AnalyticsConfig, InsightsConfig};
use crate::types::Event;
use crate::widget::{WidgetConfig, WidgetKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Context provided to detectors during a run.
pub struct InsightContext<'a> {
    /// The full event snapshot (detectors window it themselves)
    pub events: &'a [Event],
    /// The instant the run is anchored to
    pub now: DateTime<Utc>,
    /// Detector thresholds
    pub insights: &'a InsightsConfig,
    /// Widget defaults (referrer list length, traceback depth)
    pub analytics: &'a AnalyticsConfig,
}

/// A proposed, not-yet-persisted widget definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Stable content-derived id, used for archival bookkeeping
    pub id: String,
    /// Name of the detector that produced this suggestion
    pub detector: String,
    /// Short human-readable rationale
    pub title: String,
    /// The widget the dashboard would create on acceptance
    pub config: WidgetConfig,
}

impl Suggestion {
    /// Build a suggestion, deriving the id from the proposed configuration.
    ///
    /// The title is excluded from the hash so wording changes do not
    /// resurrect archived suggestions.
    pub fn new(detector: &str, title: impl Into<String>, config: WidgetConfig) -> Self {
        Self {
            id: suggestion_id(&config),
            detector: detector.to_string(),
            title: title.into(),
            config,
        }
    }
}

/// Stable id for a proposed widget configuration.
///
/// `WidgetConfig` serializes with a fixed field order, so the hash is
/// deterministic for identical configurations.
fn suggestion_id(config: &WidgetConfig) -> String {
    let serialized =
        serde_json::to_string(config).expect("widget configuration serializes to JSON");
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Trait that all insight detectors must implement.
pub trait InsightDetector: Send + Sync {
    /// Unique name for this detector.
    ///
    /// Convention: `area.pattern` (e.g. "referrer.concentration")
    fn name(&self) -> &str;

    /// Inspect the snapshot and propose a widget, or stay quiet.
    fn detect(&self, ctx: &InsightContext) -> Option<Suggestion>;
}

/// Engine that manages and runs insight detectors.
pub struct InsightEngine {
    detectors: Vec<Box<dyn InsightDetector>>,
}

impl InsightEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Register a detector with the engine.
    pub fn register(&mut self, detector: Box<dyn InsightDetector>) {
        tracing::info!(detector = detector.name(), "Registered insight detector");
        self.detectors.push(detector);
    }

    /// Get list of registered detector names.
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Check if a detector is registered.
    pub fn has_detector(&self, name: &str) -> bool {
        self.detectors.iter().any(|d| d.name() == name)
    }

    /// Run every detector and filter the candidates.
    ///
    /// Detectors run in registration order, which makes the output order
    /// reproducible. Candidates are dropped when their widget kind is in
    /// `existing_kinds` or their id is in `archived_ids`.
    pub fn run(
        &self,
        ctx: &InsightContext,
        existing_kinds: &HashSet<WidgetKind>,
        archived_ids: &HashSet<String>,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for detector in &self.detectors {
            let Some(suggestion) = detector.detect(ctx) else {
                continue;
            };

            if existing_kinds.contains(&suggestion.config.kind) {
                tracing::debug!(
                    detector = detector.name(),
                    kind = suggestion.config.kind.as_str(),
                    "Suppressing suggestion: widget kind already on dashboard"
                );
                continue;
            }
            if archived_ids.contains(&suggestion.id) {
                tracing::debug!(
                    detector = detector.name(),
                    id = %suggestion.id,
                    "Suppressing suggestion: previously archived"
                );
                continue;
            }

            tracing::info!(
                detector = detector.name(),
                kind = suggestion.config.kind.as_str(),
                "Emitting widget suggestion"
            );
            suggestions.push(suggestion);
        }

        suggestions
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}
