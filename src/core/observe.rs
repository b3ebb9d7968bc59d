//! One-shot viewport intersection observer.
//!
//! Targets are observed until they first intersect the viewport, reported
//! once, and then unobserved so later scroll passes do no work for them.

use super::page::Span;

/// How one-shot regions learn they are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityMode {
    /// Poll the observer on every scroll pass.
    #[default]
    Observe,
    /// No visibility signal: fire everything once after the page-load delay.
    FixedDelay,
}

impl VisibilityMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "observe" => Some(VisibilityMode::Observe),
            "fixed-delay" | "fixed_delay" => Some(VisibilityMode::FixedDelay),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityMode::Observe => "observe",
            VisibilityMode::FixedDelay => "fixed-delay",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityObserver<K> {
    targets: Vec<(K, Span)>,
}

impl<K> Default for VisibilityObserver<K> {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> VisibilityObserver<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: K, span: Span) {
        match self.targets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, s)) => *s = span,
            None => self.targets.push((key, span)),
        }
    }

    pub fn unobserve(&mut self, key: K) -> bool {
        let before = self.targets.len();
        self.targets.retain(|(k, _)| *k != key);
        self.targets.len() != before
    }

    pub fn is_observing(&self, key: K) -> bool {
        self.targets.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Update spans of targets that are still observed (after a relayout).
    pub fn resync(&mut self, spans: &[(K, Span)]) {
        for (key, span) in &mut self.targets {
            if let Some((_, fresh)) = spans.iter().find(|(k, _)| k == key) {
                *span = *fresh;
            }
        }
    }

    /// Targets now intersecting the viewport, in observation order.  Each is
    /// unobserved as it is returned.
    pub fn poll(&mut self, scroll_y: f64, viewport_height: f64) -> Vec<K> {
        let mut hits = Vec::new();
        self.targets.retain(|(key, span)| {
            if span.intersects(scroll_y, viewport_height) {
                hits.push(*key);
                false
            } else {
                true
            }
        });
        hits
    }

    /// Fire and unobserve every remaining target (fixed-delay fallback).
    pub fn drain_all(&mut self) -> Vec<K> {
        self.targets.drain(..).map(|(k, _)| k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_target_once() {
        let mut obs = VisibilityObserver::new();
        obs.observe(1, Span::new(100.0, 50.0));
        obs.observe(2, Span::new(2000.0, 50.0));

        assert_eq!(obs.poll(0.0, 800.0), vec![1]);
        assert_eq!(obs.poll(0.0, 800.0), Vec::<i32>::new());
        assert!(!obs.is_observing(1));

        assert_eq!(obs.poll(1500.0, 800.0), vec![2]);
        assert!(obs.is_empty());
    }

    #[test]
    fn targets_above_the_viewport_do_not_intersect() {
        let mut obs = VisibilityObserver::new();
        obs.observe('a', Span::new(0.0, 100.0));
        assert!(obs.poll(100.0, 800.0).is_empty());
        assert_eq!(obs.poll(99.0, 800.0), vec!['a']);
    }

    #[test]
    fn zero_height_targets_never_fire_by_scrolling() {
        let mut obs = VisibilityObserver::new();
        obs.observe(0, Span::new(10.0, 0.0));
        assert!(obs.poll(0.0, 800.0).is_empty());
        assert_eq!(obs.drain_all(), vec![0]);
    }

    #[test]
    fn resync_moves_pending_targets() {
        let mut obs = VisibilityObserver::new();
        obs.observe(0, Span::new(5000.0, 10.0));
        obs.resync(&[(0, Span::new(10.0, 10.0))]);
        assert_eq!(obs.poll(0.0, 100.0), vec![0]);
    }
}
