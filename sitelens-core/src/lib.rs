//! # sitelens-core
//!
//! In-memory analytics engine for the sitelens web analytics dashboard.
//!
//! This library provides:
//! - Domain types for tracked events and widget configuration
//! - Session reconstruction with a layered identity heuristic
//! - Time-windowed aggregates, funnels, traceback attribution, and
//!   conversion metrics
//! - Insight detectors that suggest new dashboard widgets
//! - Configuration and logging infrastructure
//!
//! ## Architecture
//!
//! The engine is a pure computation library: the hosting dashboard hands
//! in a read-only event snapshot plus a widget's persisted configuration,
//! and gets back a plain derived result for the rendering layer. Nothing
//! here performs I/O, caches across invocations, or mutates its inputs;
//! reading events and persisting configuration belong to external
//! collaborators.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitelens_core::widget::{self, WidgetConfig, WidgetKind};
//! use sitelens_core::window::TimeFrame;
//!
//! let events = vec![]; // supplied by the ingestion collaborator
//! let config = WidgetConfig::new(WidgetKind::EventCount, TimeFrame::Day);
//! let data = widget::compute(&events, &config, chrono::Utc::now()).expect("well-formed config");
//! println!("{:?}", data);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use insights::{create_default_engine, InsightEngine, Suggestion};
pub use types::Event;
pub use widget::{WidgetConfig, WidgetData, WidgetKind};
pub use window::TimeFrame;

// Public modules
pub mod aggregate;
pub mod config;
pub mod conversion;
pub mod dashboard;
pub mod error;
pub mod flow;
pub mod insights;
pub mod logging;
pub mod registry;
pub mod session;
pub mod traceback;
pub mod types;
pub mod widget;
pub mod window;
