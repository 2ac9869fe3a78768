//! Widget catalog for discovery and configuration UIs.
//!
//! An explicit, constructed table handed to the dashboard and rendering
//! layers at startup; nothing registers itself as an import side effect.

use crate::widget::WidgetKind;

/// Descriptor for one widget kind.
#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    pub kind: WidgetKind,
    /// Display title for the widget picker
    pub title: &'static str,
    pub summary: &'static str,
    /// Configuration fields the widget editor must collect
    pub config_fields: &'static [&'static str],
}

const WIDGETS: &[WidgetDescriptor] = &[
    WidgetDescriptor {
        kind: WidgetKind::EventCount,
        title: "Events",
        summary: "Total tracked events inside the selected time frame.",
        config_fields: &["time_frame"],
    },
    WidgetDescriptor {
        kind: WidgetKind::UniquePages,
        title: "Unique pages",
        summary: "Distinct page paths visited inside the selected time frame.",
        config_fields: &["time_frame"],
    },
    WidgetDescriptor {
        kind: WidgetKind::TopReferrers,
        title: "Top referrers",
        summary: "Ranked referring sites, normalized to their host.",
        config_fields: &["time_frame", "limit"],
    },
    WidgetDescriptor {
        kind: WidgetKind::Flow,
        title: "Page flow",
        summary: "Transition rates along an ordered list of 2-4 pages, with top detours.",
        config_fields: &["time_frame", "flow_pages"],
    },
    WidgetDescriptor {
        kind: WidgetKind::Traceback,
        title: "Traceback",
        summary: "Pages visited right before sessions reached a target page or any not-found page.",
        config_fields: &["time_frame", "target_page", "track_not_found", "max_depth"],
    },
    WidgetDescriptor {
        kind: WidgetKind::Conversion,
        title: "Conversion",
        summary: "Rate between visits to an activating page and a qualifying event.",
        config_fields: &[
            "time_frame",
            "activating_page",
            "conversion_event",
            "filter",
        ],
    },
];

/// List all available widget kinds.
pub fn list_widgets() -> Vec<WidgetDescriptor> {
    WIDGETS.to_vec()
}

/// Look up the descriptor for one widget kind.
pub fn descriptor_for(kind: WidgetKind) -> &'static WidgetDescriptor {
    WIDGETS
        .iter()
        .find(|d| d.kind == kind)
        .expect("every widget kind has a descriptor")
}
