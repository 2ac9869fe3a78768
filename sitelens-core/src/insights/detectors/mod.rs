//! Built-in insight detectors
//!
//! Each detector lives in its own subdirectory so it can grow extra files
//! without crowding the others.
//!
//! ## Built-in battery
//!
//! - [`traffic_pulse`]: sustained 24h event volume
//! - [`referrer_concentration`]: one referrer dominating acquisition
//! - [`not_found`]: visitors landing on not-found pages
//! - [`flow_candidate`]: a frequent direct page transition
//! - [`conversion_candidate`]: a measurable activation-to-event funnel
//!
//! ## Creating Custom Detectors
//!
//! 1. Create a module implementing [`InsightDetector`](super::InsightDetector)
//! 2. Register it via [`InsightEngine::register`](super::InsightEngine::register)
//!
//! Or use [`create_default_engine`] / [`create_engine`] for the built-ins.

pub mod conversion_candidate;
pub mod flow_candidate;
pub mod not_found;
pub mod referrer_concentration;
pub mod traffic_pulse;

use super::InsightEngine;
use crate::config::InsightsConfig;

/// Create an engine with all built-in detectors registered.
pub fn create_default_engine() -> InsightEngine {
    create_engine(&InsightsConfig::default())
}

/// Create an engine with the built-in battery, honoring the disabled list.
pub fn create_engine(config: &InsightsConfig) -> InsightEngine {
    let mut engine = InsightEngine::new();

    let battery: Vec<Box<dyn super::InsightDetector>> = vec![
        Box::new(traffic_pulse::TrafficPulse::new()),
        Box::new(referrer_concentration::ReferrerConcentration::new()),
        Box::new(not_found::NotFoundTraffic::new()),
        Box::new(flow_candidate::FlowCandidate::new()),
        Box::new(conversion_candidate::ConversionCandidate::new()),
    ];

    for detector in battery {
        if config
            .disabled_detectors
            .iter()
            .any(|name| name == detector.name())
        {
            tracing::info!(detector = detector.name(), "Skipping disabled detector");
            continue;
        }
        engine.register(detector);
    }

    engine
}
