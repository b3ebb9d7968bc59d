//! Scroll geometry and the values derived from it on every scroll pass.

use super::clock::Millis;
use super::page::SectionId;

/// Background layer moves at half the scroll speed.
pub const PARALLAX_FACTOR: f64 = 0.5;
/// Degrees of orbit rotation per scrolled pixel.
pub const ORBIT_FACTOR: f64 = 0.1;
/// Angular spacing between decorative orbit items.
pub const ORBIT_SPACING_DEG: f64 = 60.0;
/// Past this offset the navbar switches to its condensed style.
pub const NAVBAR_CONDENSE_AT: f64 = 100.0;

/// At most one full scroll pass per display frame.
pub const SCROLL_FRAME_BUDGET: Millis = 16;
/// Resize recomputation waits for this much quiet.
pub const RESIZE_SETTLE: Millis = 250;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollGeometry {
    pub scroll_y: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollGeometry {
    /// Largest reachable `scroll_y`; zero when content fits the viewport.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    pub fn clamp(&self, y: f64) -> f64 {
        y.clamp(0.0, self.max_scroll())
    }
}

pub fn progress_percent(geometry: &ScrollGeometry) -> f64 {
    let max = geometry.max_scroll();
    if max <= 0.0 {
        return 0.0;
    }
    (geometry.scroll_y / max * 100.0).clamp(0.0, 100.0)
}

pub fn parallax_offset(scroll_y: f64) -> f64 {
    scroll_y * PARALLAX_FACTOR
}

/// Rotation in degrees of the `index`-th orbit item.
pub fn orbit_rotation(scroll_y: f64, index: usize) -> f64 {
    scroll_y * ORBIT_FACTOR + index as f64 * ORBIT_SPACING_DEG
}

/// Snapshot of everything derived from the current scroll position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollState {
    pub scroll_y: f64,
    pub progress_percent: f64,
    pub active_section: Option<SectionId>,
    pub parallax_offset: f64,
    pub navbar_condensed: bool,
}

/// Holds the latest [`ScrollState`]; recomputed once per scroll pass.
#[derive(Debug, Default)]
pub struct ScrollTracker {
    state: ScrollState,
    orbit_items: usize,
    passes: u64,
}

impl ScrollTracker {
    pub fn new(orbit_items: usize) -> Self {
        Self {
            orbit_items,
            ..Self::default()
        }
    }

    /// Recompute the scalar values.  The active section is resolved by the
    /// navigation controller and stored with [`set_active`](Self::set_active).
    pub fn update(&mut self, geometry: &ScrollGeometry) -> &ScrollState {
        self.passes += 1;
        self.state.scroll_y = geometry.scroll_y;
        self.state.progress_percent = progress_percent(geometry);
        self.state.parallax_offset = parallax_offset(geometry.scroll_y);
        self.state.navbar_condensed = geometry.scroll_y > NAVBAR_CONDENSE_AT;
        &self.state
    }

    pub fn set_active(&mut self, section: Option<SectionId>) {
        self.state.active_section = section;
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn orbit_rotations(&self) -> Vec<f64> {
        (0..self.orbit_items)
            .map(|i| orbit_rotation(self.state.scroll_y, i))
            .collect()
    }

    /// Number of scroll passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geom(scroll_y: f64) -> ScrollGeometry {
        ScrollGeometry {
            scroll_y,
            document_height: 3000.0,
            viewport_height: 800.0,
        }
    }

    #[test]
    fn progress_endpoints() {
        assert_eq!(progress_percent(&geom(0.0)), 0.0);
        assert_eq!(progress_percent(&geom(2200.0)), 100.0);
        assert_eq!(progress_percent(&geom(1100.0)), 50.0);
    }

    #[test]
    fn short_content_has_zero_progress() {
        let g = ScrollGeometry {
            scroll_y: 40.0,
            document_height: 500.0,
            viewport_height: 800.0,
        };
        assert_eq!(g.max_scroll(), 0.0);
        assert_eq!(progress_percent(&g), 0.0);
    }

    #[test]
    fn derived_offsets() {
        let mut tracker = ScrollTracker::new(3);
        let state = tracker.update(&geom(200.0)).clone();
        assert_eq!(state.parallax_offset, 100.0);
        assert!(state.navbar_condensed);
        assert_eq!(tracker.orbit_rotations(), vec![20.0, 80.0, 140.0]);
        tracker.update(&geom(100.0));
        assert!(!tracker.state().navbar_condensed);
        assert_eq!(tracker.passes(), 2);
    }

    proptest! {
        #[test]
        fn progress_is_monotone_and_bounded(
            doc in 0.0f64..20_000.0,
            view in 1.0f64..2_000.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let max = (doc - view).max(0.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p = |s: f64| progress_percent(&ScrollGeometry {
                scroll_y: s,
                document_height: doc,
                viewport_height: view,
            });
            let (plo, phi) = (p(lo * max), p(hi * max));
            prop_assert!((0.0..=100.0).contains(&plo));
            prop_assert!((0.0..=100.0).contains(&phi));
            prop_assert!(plo <= phi);
        }
    }
}
