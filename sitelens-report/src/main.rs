//! sitelens-report - dashboard report CLI
//!
//! Loads an event snapshot from a JSON file, runs the analytics engine the
//! way the dashboard would, and prints a plain-text report: overview
//! numbers, top referrers, and any widget suggestions the insight
//! detectors produce.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use sitelens_core::dashboard::DashboardStats;
use sitelens_core::insights::{self, InsightContext};
use sitelens_core::{Config, Event};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitelens-report")]
#[command(about = "sitelens - dashboard report from an event snapshot")]
#[command(version)]
struct Args {
    /// Path to the event snapshot (JSON array of events)
    events: PathBuf,

    /// Anchor instant for all time windows (RFC 3339; default: now)
    #[arg(long)]
    now: Option<String>,

    /// Config file path (default: XDG config location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path).context("failed to load configuration")?,
        None => Config::load().context("failed to load configuration")?,
    };
    let _log_guard = sitelens_core::logging::init(&config.logging).ok();

    let raw = std::fs::read_to_string(&args.events)
        .with_context(|| format!("failed to read {}", args.events.display()))?;
    let events: Vec<Event> = serde_json::from_str(&raw).context("failed to parse events")?;

    let now = match &args.now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .context("invalid --now value, expected RFC 3339")?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let stats = DashboardStats::compute(&events, now, config.analytics.top_referrers_limit);

    let engine = insights::create_engine(&config.insights);
    let ctx = InsightContext {
        events: &events,
        now,
        insights: &config.insights,
        analytics: &config.analytics,
    };
    // A one-shot report has no dashboard state to filter against
    let suggestions = engine.run(&ctx, &HashSet::new(), &HashSet::new());

    if args.json {
        print_json(&stats, &suggestions)?;
    } else {
        print_terminal(&stats, &suggestions, events.len());
    }

    Ok(())
}

fn print_terminal(
    stats: &DashboardStats,
    suggestions: &[sitelens_core::Suggestion],
    snapshot_size: usize,
) {
    println!();
    println!("sitelens report ({} events in snapshot)", snapshot_size);
    println!("{}", "-".repeat(48));

    println!("EVENTS");
    println!(
        "   last hour: {:<8} last 24h: {}",
        stats.events_last_hour, stats.events_last_day
    );
    println!(
        "   last 7d:   {:<8} last 30d: {}",
        stats.events_last_week, stats.events_last_month
    );
    println!();

    println!("LAST 30 DAYS");
    println!(
        "   Sessions: {:<8} Unique pages: {}",
        stats.session_count, stats.unique_pages
    );
    if stats.unattributable_events > 0 {
        println!(
            "   ({} events had no session identity)",
            stats.unattributable_events
        );
    }
    println!();

    if !stats.top_referrers.is_empty() {
        println!("TOP REFERRERS");
        for (i, entry) in stats.top_referrers.iter().enumerate() {
            println!(
                "   {}. {:<28} {:>6}  {:>5.1}%",
                i + 1,
                entry.referrer,
                entry.count,
                entry.percentage
            );
        }
        println!();
    }

    if suggestions.is_empty() {
        println!("No widget suggestions at current thresholds.");
    } else {
        println!("SUGGESTED WIDGETS");
        for suggestion in suggestions {
            println!(
                "   [{}] {}",
                suggestion.config.kind.as_str(),
                suggestion.title
            );
        }
    }
    println!();
}

fn print_json(stats: &DashboardStats, suggestions: &[sitelens_core::Suggestion]) -> Result<()> {
    let report = serde_json::json!({
        "stats": stats,
        "suggestions": suggestions,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
