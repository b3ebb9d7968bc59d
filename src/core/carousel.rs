//! Role carousel: cycles one highlighted role label at a time.
//!
//! Idle until started.  While running, every interval tick hides the
//! current role and moves to the next one; the new role is shown after a
//! short gap.  The host owns the timers and drives [`advance`] and
//! [`reveal`]; both are no-ops once the carousel is stopped.
//!
//! [`advance`]: RoleCarousel::advance
//! [`reveal`]: RoleCarousel::reveal

use super::clock::Millis;

/// Page-load delay used when there is no visibility signal.
pub const START_DELAY: Millis = 1000;
pub const INTERVAL: Millis = 3000;
/// Time between hiding one role and showing the next.
pub const GAP: Millis = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselPhase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RoleCarousel {
    roles: Vec<String>,
    current: usize,
    shown: bool,
    phase: CarouselPhase,
}

impl RoleCarousel {
    /// The first role starts highlighted.
    pub fn new(roles: Vec<String>) -> Self {
        Self {
            roles,
            current: 0,
            shown: true,
            phase: CarouselPhase::Idle,
        }
    }

    /// Idle → Running.  Refused for an empty role list or a second start.
    pub fn start(&mut self) -> bool {
        if self.phase != CarouselPhase::Idle || self.roles.is_empty() {
            return false;
        }
        self.phase = CarouselPhase::Running;
        true
    }

    /// Interval tick: hide the current role and step to the next.
    pub fn advance(&mut self) -> bool {
        if self.phase != CarouselPhase::Running {
            return false;
        }
        self.shown = false;
        self.current = (self.current + 1) % self.roles.len();
        true
    }

    /// End of the gap: show the current role.
    pub fn reveal(&mut self) -> bool {
        if self.phase != CarouselPhase::Running {
            return false;
        }
        self.shown = true;
        true
    }

    pub fn stop(&mut self) {
        self.phase = CarouselPhase::Stopped;
    }

    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// The highlighted role, `None` during the gap.
    pub fn active(&self) -> Option<usize> {
        (self.shown && !self.roles.is_empty()).then_some(self.current)
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active().map(|i| self.roles[i].as_str())
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five() -> RoleCarousel {
        RoleCarousel::new((0..5).map(|i| format!("role {i}")).collect())
    }

    #[test]
    fn cycles_through_roles_with_gaps() {
        let mut c = five();
        assert!(c.start());
        let mut seen = vec![c.active().unwrap()];
        for _ in 0..6 {
            assert!(c.advance());
            assert_eq!(c.active(), None);
            assert!(c.reveal());
            seen.push(c.active().unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn idle_and_stopped_ignore_ticks() {
        let mut c = five();
        assert!(!c.advance());
        assert_eq!(c.active(), Some(0));

        c.start();
        assert!(!c.start());
        c.stop();
        assert!(!c.advance());
        assert!(!c.reveal());
        assert_eq!(c.phase(), CarouselPhase::Stopped);
    }

    #[test]
    fn empty_roles_never_start() {
        let mut c = RoleCarousel::new(Vec::new());
        assert!(!c.start());
        assert_eq!(c.active_label(), None);
    }
}
