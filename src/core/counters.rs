//! Stat counters and skill bars.
//!
//! Counters climb toward their target in steps of `ceil(target / 50)`, one
//! step per 50 ms frame, the first step landing the instant they trigger.
//! The value is a function of elapsed time, not of how many frames the host
//! managed to run, so a late frame catches up instead of slowing the count.

use super::clock::Millis;

pub const COUNTER_FRAME: Millis = 50;
pub const COUNTER_STEPS: u64 = 50;
/// Skill bars fill this long after they become visible.
pub const SKILL_FILL_DELAY: Millis = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCounter {
    pub label: String,
    target: u64,
    current: u64,
}

impl StatCounter {
    pub fn new(label: impl Into<String>, target: u64) -> Self {
        Self {
            label: label.into(),
            target,
            current: 0,
        }
    }

    pub fn increment(&self) -> u64 {
        self.target.div_ceil(COUNTER_STEPS)
    }

    /// Value after `steps` increments.
    pub fn value_after(&self, steps: u64) -> u64 {
        steps.saturating_mul(self.increment()).min(self.target)
    }

    /// Take one increment.  Returns `true` while still short of the target.
    pub fn step(&mut self) -> bool {
        self.current = (self.current + self.increment()).min(self.target);
        self.current < self.target
    }

    /// Catch up to `steps` increments; never moves backwards.
    fn catch_up(&mut self, steps: u64) {
        self.current = self.current.max(self.value_after(steps));
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.target
    }
}

/// The stats block: every counter starts together on one trigger.
#[derive(Debug, Clone, Default)]
pub struct StatsAnimator {
    counters: Vec<StatCounter>,
    started_at: Option<Millis>,
}

impl StatsAnimator {
    pub fn new(counters: Vec<StatCounter>) -> Self {
        Self {
            counters,
            started_at: None,
        }
    }

    /// One-shot start.  Returns `false` if already triggered.
    pub fn trigger(&mut self, now: Millis) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        self.sample(now);
        true
    }

    /// Bring every counter up to date.  Returns `true` while any is running.
    pub fn sample(&mut self, now: Millis) -> bool {
        let Some(start) = self.started_at else {
            return false;
        };
        let steps = now.saturating_sub(start) / COUNTER_FRAME + 1;
        for counter in &mut self.counters {
            counter.catch_up(steps);
        }
        self.is_running()
    }

    pub fn is_triggered(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.counters.iter().any(|c| !c.is_done())
    }

    pub fn counters(&self) -> &[StatCounter] {
        &self.counters
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillBar {
    pub label: String,
    target: u8,
    fill: Option<u8>,
    scheduled: bool,
}

impl SkillBar {
    pub fn new(label: impl Into<String>, target: u8) -> Self {
        Self {
            label: label.into(),
            target: target.min(100),
            fill: None,
            scheduled: false,
        }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    /// Applied fill percentage; `None` until the bar has been filled.
    pub fn fill(&self) -> Option<u8> {
        self.fill
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkillBars {
    bars: Vec<SkillBar>,
}

impl SkillBars {
    pub fn new(bars: Vec<SkillBar>) -> Self {
        Self { bars }
    }

    /// First visibility of bar `index`: returns the fill delay, once.
    pub fn on_visible(&mut self, index: usize) -> Option<Millis> {
        let bar = self.bars.get_mut(index)?;
        if bar.scheduled {
            return None;
        }
        bar.scheduled = true;
        Some(SKILL_FILL_DELAY)
    }

    /// Apply the target fill.  Returns `false` if it was already applied.
    pub fn apply(&mut self, index: usize) -> bool {
        match self.bars.get_mut(index) {
            Some(bar) if bar.fill.is_none() => {
                bar.fill = Some(bar.target);
                true
            }
            _ => false,
        }
    }

    pub fn bars(&self) -> &[SkillBar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn steps_of_three_end_exactly_on_137() {
        let mut c = StatCounter::new("commits", 137);
        assert_eq!(c.increment(), 3);
        let mut deltas = Vec::new();
        loop {
            let before = c.current();
            let more = c.step();
            deltas.push(c.current() - before);
            if !more {
                break;
            }
        }
        assert_eq!(deltas.len(), 46);
        assert!(deltas[..45].iter().all(|&d| d == 3));
        assert_eq!(deltas[45], 2);
        assert_eq!(c.current(), 137);
    }

    #[test]
    fn animator_is_keyed_by_elapsed_time() {
        let mut stats = StatsAnimator::new(vec![StatCounter::new("a", 137), StatCounter::new("b", 8)]);
        assert!(stats.trigger(1000));
        assert_eq!(stats.counters()[0].current(), 3);
        assert_eq!(stats.counters()[1].current(), 1);

        // a late frame catches up: 5 frames elapsed → 6 steps
        stats.sample(1250);
        assert_eq!(stats.counters()[0].current(), 18);
        assert_eq!(stats.counters()[1].current(), 6);

        assert!(!stats.sample(1000 + 45 * COUNTER_FRAME));
        assert_eq!(stats.counters()[0].current(), 137);
        assert!(!stats.trigger(5000));
    }

    #[test]
    fn zero_target_is_done_immediately() {
        let mut stats = StatsAnimator::new(vec![StatCounter::new("none", 0)]);
        stats.trigger(0);
        assert!(!stats.is_running());
        assert_eq!(stats.counters()[0].current(), 0);
    }

    #[test]
    fn skill_bar_fills_once() {
        let mut bars = SkillBars::new(vec![SkillBar::new("Rust", 60)]);
        assert_eq!(bars.on_visible(0), Some(SKILL_FILL_DELAY));
        assert_eq!(bars.on_visible(0), None);
        assert!(bars.apply(0));
        assert!(!bars.apply(0));
        assert_eq!(bars.bars()[0].fill(), Some(60));
        assert_eq!(bars.on_visible(7), None);
    }

    proptest! {
        #[test]
        fn counter_converges_without_overshoot(target in 0u64..100_000) {
            let mut c = StatCounter::new("x", target);
            let mut steps = 0;
            let mut last = 0;
            while c.step() {
                prop_assert!(c.current() >= last);
                prop_assert!(c.current() <= target);
                last = c.current();
                steps += 1;
                prop_assert!(steps <= COUNTER_STEPS);
            }
            prop_assert_eq!(c.current(), target);
        }
    }
}
