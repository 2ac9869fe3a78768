//! Conversion candidate detector.
//!
//! Looks for a custom event type (anything but plain pageviews) firing
//! often enough in the last 30 days to be worth a conversion widget, and
//! pairs it with the most visited page as the activating step. The pairing
//! is validated through the conversion calculator before suggesting, so a
//! widget is only proposed when it would show a real funnel.

use crate::conversion::{self, ConversionOutcome};
use crate::insights::engine::{InsightContext, InsightDetector, Suggestion};
use crate::widget::{WidgetConfig, WidgetKind};
use crate::window::{self, TimeFrame};
use std::collections::HashMap;

pub struct ConversionCandidate;

impl ConversionCandidate {
    pub fn new() -> Self {
        Self
    }

    /// Most frequent value, ties resolved to the smallest key.
    fn dominant(counts: HashMap<&str, u64>) -> Option<(String, u64)> {
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(key, count)| (key.to_string(), count))
    }
}

impl Default for ConversionCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightDetector for ConversionCandidate {
    fn name(&self) -> &str {
        "conversion.candidate"
    }

    fn detect(&self, ctx: &InsightContext) -> Option<Suggestion> {
        let windowed = window::filter_events(ctx.events, TimeFrame::Month, ctx.now);

        let mut event_types: HashMap<&str, u64> = HashMap::new();
        let mut pages: HashMap<&str, u64> = HashMap::new();
        for event in &windowed {
            if event.is_pageview() {
                if let Some(path) = event.path() {
                    *pages.entry(path).or_insert(0) += 1;
                }
            } else {
                *event_types.entry(event.event_type.as_str()).or_insert(0) += 1;
            }
        }

        let (conversion_event, count) = Self::dominant(event_types)?;
        if count < ctx.insights.conversion_min_events {
            return None;
        }
        let (activating_page, _) = Self::dominant(pages)?;

        // Only suggest a funnel the calculator can actually measure
        let outcome = conversion::analyze(
            ctx.events,
            TimeFrame::Month,
            ctx.now,
            Some(&activating_page),
            Some(&conversion_event),
            None,
        );
        let ConversionOutcome::Computed(metrics) = outcome else {
            return None;
        };
        if metrics.activating_visitor_count == 0 {
            return None;
        }

        let mut config = WidgetConfig::new(WidgetKind::Conversion, TimeFrame::Month);
        config.activating_page = Some(activating_page.clone());
        config.conversion_event = Some(conversion_event.clone());

        Some(Suggestion::new(
            self.name(),
            format!(
                "Measure how {} visits convert into {} events",
                activating_page, conversion_event
            ),
            config,
        ))
    }
}
