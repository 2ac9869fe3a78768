//! Insight generation for sitelens
//!
//! Detectors scan the event snapshot for patterns worth a dashboard widget
//! of their own and emit [`Suggestion`]s the dashboard can offer to the
//! user. Each detector is an independent strategy behind the
//! [`InsightDetector`] trait; the [`InsightEngine`] runs them in
//! registration order and filters out suggestions whose widget kind is
//! already on the dashboard or whose id was previously archived.
//!
//! See [`engine`] for the framework and [`detectors`] for the built-in
//! battery.

pub mod detectors;
pub mod engine;

pub use detectors::{create_default_engine, create_engine};
pub use engine::{InsightContext, InsightDetector, InsightEngine, Suggestion};
