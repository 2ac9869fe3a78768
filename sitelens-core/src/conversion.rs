//! Conversion metrics: a two-stage funnel between an activating page and a
//! qualifying event type.
//!
//! A session "activates" when any of its in-window events was recorded on
//! the activating page; conversions are in-window events of the configured
//! type whose session identity belongs to an activated session and whose
//! payload passes the optional property filter. The rate is conversions
//! per activating visitor, as a percentage.

use crate::session::SessionKey;
use crate::types::Event;
use crate::window::{self, TimeFrame};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Comparison operator of a payload property filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "contains")]
    Contains,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Contains => "contains",
        }
    }
}

impl std::str::FromStr for FilterOp {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(FilterOp::Gt),
            ">=" => Ok(FilterOp::Gte),
            "=" => Ok(FilterOp::Eq),
            "<" => Ok(FilterOp::Lt),
            "<=" => Ok(FilterOp::Lte),
            "contains" => Ok(FilterOp::Contains),
            _ => Err(crate::error::Error::Config(format!(
                "unknown filter operator: {}",
                s
            ))),
        }
    }
}

/// Optional comparison filter applied to conversion event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Payload key to compare
    pub property: String,
    pub op: FilterOp,
    /// Right-hand side, as entered in the widget configuration
    pub value: String,
}

impl PropertyFilter {
    /// Evaluate the filter against one event.
    ///
    /// Numeric comparison when both sides parse as numbers, string
    /// comparison/containment otherwise. An event without the property
    /// never matches.
    pub fn matches(&self, event: &Event) -> bool {
        let Some(actual) = event.property(&self.property) else {
            return false;
        };
        let actual = scalar_to_string(actual);

        match (actual.parse::<f64>(), self.value.parse::<f64>()) {
            (Ok(lhs), Ok(rhs)) => match self.op {
                FilterOp::Gt => lhs > rhs,
                FilterOp::Gte => lhs >= rhs,
                FilterOp::Eq => lhs == rhs,
                FilterOp::Lt => lhs < rhs,
                FilterOp::Lte => lhs <= rhs,
                FilterOp::Contains => actual.contains(&self.value),
            },
            _ => match self.op {
                FilterOp::Gt => actual.as_str() > self.value.as_str(),
                FilterOp::Gte => actual.as_str() >= self.value.as_str(),
                FilterOp::Eq => actual == self.value,
                FilterOp::Lt => actual.as_str() < self.value.as_str(),
                FilterOp::Lte => actual.as_str() <= self.value.as_str(),
                FilterOp::Contains => actual.contains(&self.value),
            },
        }
    }
}

/// Render a scalar payload value the way the widget editor shows it.
fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Computed two-stage funnel numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionMetrics {
    /// `conversion_count / activating_visitor_count * 100`, 0 when the
    /// denominator is 0
    pub rate: f64,
    /// Qualifying conversion events in the window
    pub conversion_count: u64,
    /// Sessions that visited the activating page in the window
    pub activating_visitor_count: u64,
}

/// Outcome of a conversion computation.
///
/// "Not configured" is distinct from a computed zero so the dashboard can
/// show a guidance message instead of a misleading 0% rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// Activating page or conversion event type is missing
    NotConfigured,
    Computed(ConversionMetrics),
}

/// Compute conversion metrics for one window.
pub fn analyze(
    events: &[Event],
    frame: TimeFrame,
    now: DateTime<Utc>,
    activating_page: Option<&str>,
    conversion_event: Option<&str>,
    filter: Option<&PropertyFilter>,
) -> ConversionOutcome {
    let (Some(activating_page), Some(conversion_event)) = (
        activating_page.filter(|p| !p.is_empty()),
        conversion_event.filter(|t| !t.is_empty()),
    ) else {
        return ConversionOutcome::NotConfigured;
    };

    let windowed = window::filter_events(events, frame, now);

    let activated: HashSet<SessionKey> = windowed
        .iter()
        .filter(|e| e.path() == Some(activating_page))
        .filter_map(|e| SessionKey::for_event(e))
        .collect();

    let conversion_count = windowed
        .iter()
        .filter(|e| e.event_type == conversion_event)
        .filter(|e| {
            SessionKey::for_event(e)
                .map(|key| activated.contains(&key))
                .unwrap_or(false)
        })
        .filter(|e| filter.map(|f| f.matches(e)).unwrap_or(true))
        .count() as u64;

    let activating_visitor_count = activated.len() as u64;
    let rate = if activating_visitor_count == 0 {
        0.0
    } else {
        conversion_count as f64 / activating_visitor_count as f64 * 100.0
    };

    ConversionOutcome::Computed(ConversionMetrics {
        rate,
        conversion_count,
        activating_visitor_count,
    })
}
