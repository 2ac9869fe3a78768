//! Widget configuration and dispatch.
//!
//! Each dashboard widget persists one [`WidgetConfig`] and, on every
//! render, invokes exactly one analysis through [`compute`]. The result is
//! a plain [`WidgetData`] value for the rendering collaborator; no
//! formatting or layout concerns live here.
//!
//! Incomplete configuration resolves to [`WidgetData::NotConfigured`] so
//! the dashboard can show a guidance message; only malformed configuration
//! (page list over the maximum, non-positive depth) is an `Err`.

use crate::aggregate::{self, ReferrerEntry, DEFAULT_REFERRER_LIMIT};
use crate::conversion::{self, ConversionMetrics, ConversionOutcome, PropertyFilter};
use crate::error::{Error, Result};
use crate::flow::{self, FlowStep, MAX_FLOW_PAGES, MIN_FLOW_PAGES};
use crate::session::SessionCache;
use crate::traceback::{self, TracebackReport, TracebackTarget, DEFAULT_MAX_DEPTH};
use crate::types::Event;
use crate::window::TimeFrame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The analyses a dashboard widget can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    EventCount,
    UniquePages,
    TopReferrers,
    Flow,
    Traceback,
    Conversion,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::EventCount => "event_count",
            WidgetKind::UniquePages => "unique_pages",
            WidgetKind::TopReferrers => "top_referrers",
            WidgetKind::Flow => "flow",
            WidgetKind::Traceback => "traceback",
            WidgetKind::Conversion => "conversion",
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WidgetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "event_count" => Ok(WidgetKind::EventCount),
            "unique_pages" => Ok(WidgetKind::UniquePages),
            "top_referrers" => Ok(WidgetKind::TopReferrers),
            "flow" => Ok(WidgetKind::Flow),
            "traceback" => Ok(WidgetKind::Traceback),
            "conversion" => Ok(WidgetKind::Conversion),
            _ => Err(Error::Config(format!("unknown widget kind: {}", s))),
        }
    }
}

/// Persisted configuration of one dashboard widget.
///
/// Owned by the dashboard-state collaborator; the engine only reads it.
/// Component-specific fields are optional and ignored by the other
/// analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub kind: WidgetKind,
    pub time_frame: TimeFrame,

    /// Ordered page list for flow widgets (2-4 entries)
    #[serde(default)]
    pub flow_pages: Vec<String>,

    /// Exact target page for traceback widgets
    #[serde(default)]
    pub target_page: Option<String>,
    /// Trace the not-found page class instead of a single page
    #[serde(default)]
    pub track_not_found: bool,
    /// Backward depth for traceback widgets
    #[serde(default)]
    pub max_depth: Option<i64>,

    /// Activating page for conversion widgets
    #[serde(default)]
    pub activating_page: Option<String>,
    /// Qualifying event type for conversion widgets
    #[serde(default)]
    pub conversion_event: Option<String>,
    /// Optional payload property filter for conversion widgets
    #[serde(default)]
    pub filter: Option<PropertyFilter>,

    /// List length for top-referrer widgets
    #[serde(default)]
    pub limit: Option<usize>,
}

impl WidgetConfig {
    /// Minimal configuration for widgets without component-specific fields.
    pub fn new(kind: WidgetKind, time_frame: TimeFrame) -> Self {
        Self {
            kind,
            time_frame,
            flow_pages: Vec::new(),
            target_page: None,
            track_not_found: false,
            max_depth: None,
            activating_page: None,
            conversion_event: None,
            filter: None,
            limit: None,
        }
    }
}

/// Computed result of one widget render, one variant per analysis family.
///
/// Serialize-only: results flow out to the rendering collaborator and are
/// never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "data", rename_all = "snake_case")]
pub enum WidgetData {
    /// A required configuration field is missing; `missing` names it
    NotConfigured { missing: &'static str },
    EventCount { count: usize },
    UniquePages { count: usize },
    TopReferrers { referrers: Vec<ReferrerEntry> },
    Flow { steps: Vec<FlowStep> },
    Traceback { report: TracebackReport },
    Conversion { metrics: ConversionMetrics },
}

/// Run the analysis a widget's configuration selects.
///
/// One-shot entry point; a dashboard rendering several widgets over the
/// same snapshot should share a [`SessionCache`] via [`compute_with_cache`]
/// instead.
pub fn compute(events: &[Event], config: &WidgetConfig, now: DateTime<Utc>) -> Result<WidgetData> {
    let mut cache = SessionCache::new(events, now);
    compute_with_cache(&mut cache, config)
}

/// Run a widget's analysis, reusing the render pass's session cache.
pub fn compute_with_cache(
    cache: &mut SessionCache<'_>,
    config: &WidgetConfig,
) -> Result<WidgetData> {
    let events = cache.events();
    let now = cache.now();
    let frame = config.time_frame;

    tracing::debug!(
        kind = config.kind.as_str(),
        frame = frame.as_str(),
        events = events.len(),
        "Computing widget"
    );

    match config.kind {
        WidgetKind::EventCount => Ok(WidgetData::EventCount {
            count: aggregate::event_count(events, frame, now),
        }),
        WidgetKind::UniquePages => Ok(WidgetData::UniquePages {
            count: aggregate::unique_pages(events, frame, now),
        }),
        WidgetKind::TopReferrers => Ok(WidgetData::TopReferrers {
            referrers: aggregate::top_referrers(
                events,
                frame,
                now,
                config.limit.unwrap_or(DEFAULT_REFERRER_LIMIT),
            ),
        }),
        WidgetKind::Flow => {
            if config.flow_pages.len() < MIN_FLOW_PAGES {
                return Ok(WidgetData::NotConfigured {
                    missing: "flow_pages",
                });
            }
            if config.flow_pages.len() > MAX_FLOW_PAGES {
                return Err(Error::Config(format!(
                    "flow widgets support at most {} pages, got {}",
                    MAX_FLOW_PAGES,
                    config.flow_pages.len()
                )));
            }
            let sessions = cache.sessions_within(frame);
            Ok(WidgetData::Flow {
                steps: flow::analyze(sessions, &config.flow_pages),
            })
        }
        WidgetKind::Traceback => {
            let target = if config.track_not_found {
                TracebackTarget::NotFound
            } else {
                match config.target_page.as_deref().filter(|p| !p.is_empty()) {
                    Some(path) => TracebackTarget::Page {
                        path: path.to_string(),
                    },
                    None => {
                        return Ok(WidgetData::NotConfigured {
                            missing: "target_page",
                        })
                    }
                }
            };
            let depth = config.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
            let sessions = cache.sessions_within(frame);
            Ok(WidgetData::Traceback {
                report: traceback::analyze_sessions(sessions, &target, depth)?,
            })
        }
        WidgetKind::Conversion => {
            let outcome = conversion::analyze(
                events,
                frame,
                now,
                config.activating_page.as_deref(),
                config.conversion_event.as_deref(),
                config.filter.as_ref(),
            );
            Ok(match outcome {
                ConversionOutcome::NotConfigured => WidgetData::NotConfigured {
                    missing: "activating_page and conversion_event",
                },
                ConversionOutcome::Computed(metrics) => WidgetData::Conversion { metrics },
            })
        }
    }
}
