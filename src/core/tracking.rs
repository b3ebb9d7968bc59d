//! Interaction tracking: fixed-shape event records and scroll-depth
//! milestones.

use serde::Serialize;

/// Scroll-depth thresholds, in percent.
pub const MILESTONES: [u8; 4] = [25, 50, 75, 100];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingEvent {
    pub action: String,
    pub category: String,
    pub label: String,
}

impl TrackingEvent {
    pub fn click(label: impl Into<String>) -> Self {
        Self {
            action: "click".into(),
            category: "Navigation".into(),
            label: label.into(),
        }
    }

    pub fn scroll_depth(milestone: u8) -> Self {
        Self {
            action: "scroll_depth".into(),
            category: "Engagement".into(),
            label: format!("{milestone}%"),
        }
    }
}

/// Where tracking records go.  Sinks are best-effort: they report their own
/// failures and never fail the caller.
pub trait TrackingSink {
    fn record(&mut self, event: &TrackingEvent);
}

/// Keeps every record; used by tests and as a no-op placeholder.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<TrackingEvent>,
}

impl TrackingSink for MemorySink {
    fn record(&mut self, event: &TrackingEvent) {
        self.events.push(event.clone());
    }
}

/// Per-session milestone watermark.
#[derive(Debug, Default)]
pub struct ScrollDepthTracker {
    /// Highest milestone already reported.
    watermark: u8,
}

impl ScrollDepthTracker {
    /// Milestones newly crossed by `progress`, in increasing order.  A
    /// milestone at or below the watermark never fires again.
    pub fn observe(&mut self, progress: f64) -> Vec<u8> {
        let crossed: Vec<u8> = MILESTONES
            .iter()
            .copied()
            .filter(|&m| m > self.watermark && progress >= f64::from(m))
            .collect();
        if let Some(&top) = crossed.last() {
            self.watermark = top;
        }
        crossed
    }

    pub fn watermark(&self) -> u8 {
        self.watermark
    }
}
