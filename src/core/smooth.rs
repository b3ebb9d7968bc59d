//! Smooth scrolling with exponential ease-out.
//!
//! When a scroll target is requested, the position closes a fixed fraction
//! of the remaining distance every 16 ms reference frame.  The decay is
//! applied per elapsed millisecond, so the motion is the same at any frame
//! rate.

use super::clock::Millis;

/// Reference frame length the `speed` fraction is expressed against.
const REFERENCE_FRAME_MS: f64 = 16.0;
/// Snap to the target once closer than this many pixels.
const SETTLE_PX: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    position: f64,
    target: Option<f64>,
    /// Fraction of the remaining distance covered per reference frame.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            position: 0.0,
            target: None,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Start easing from `from` toward `to`.
    pub fn set_target(&mut self, from: f64, to: f64) {
        self.position = from;
        self.target = Some(to);
    }

    /// Drop the animation (e.g. the user grabbed the scroll wheel).
    pub fn cancel(&mut self) {
        self.target = None;
    }

    /// Advance by `dt` ms.  Returns the new position while animating.
    pub fn tick(&mut self, dt: Millis) -> Option<f64> {
        let target = self.target?;
        let keep = (1.0 - self.speed).powf(dt as f64 / REFERENCE_FRAME_MS);
        self.position = target + (self.position - target) * keep;
        if (self.position - target).abs() < SETTLE_PX {
            self.position = target;
            self.target = None;
        }
        Some(self.position)
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_toward_target_and_settles() {
        let mut s = SmoothScroll::new(0.25);
        s.set_target(0.0, 1000.0);
        let first = s.tick(16).unwrap();
        assert!((first - 250.0).abs() < 1e-9);

        let mut last = first;
        while let Some(p) = s.tick(16) {
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 1000.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn frame_rate_independent() {
        let mut coarse = SmoothScroll::new(0.3);
        let mut fine = SmoothScroll::new(0.3);
        coarse.set_target(0.0, 500.0);
        fine.set_target(0.0, 500.0);
        let a = coarse.tick(32).unwrap();
        fine.tick(16);
        let b = fine.tick(16).unwrap();
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn cancel_stops_motion() {
        let mut s = SmoothScroll::new(0.3);
        s.set_target(0.0, 100.0);
        s.cancel();
        assert_eq!(s.tick(16), None);
    }
}
