//! Reveal engine: one staggered fade-in cascade per section.
//!
//! A section qualifies once its top edge is above `viewport_height - 100`.
//! Qualifying flips the section's revealed flag (one-way) and produces a
//! [`Cascade`] step delayed by `index * 200 ms`.  When that step is shown,
//! the section's cards and timeline entries follow at `ordinal * 150 ms`
//! and `ordinal * 300 ms` respectively.

use super::clock::Millis;
use super::page::{ChildKind, PageModel};

/// Distance above the viewport bottom the section top must cross.
pub const REVEAL_MARGIN: f64 = 100.0;
pub const SECTION_STAGGER: Millis = 200;
pub const CARD_STAGGER: Millis = 150;
pub const TIMELINE_STAGGER: Millis = 300;

impl ChildKind {
    pub fn stagger(self) -> Millis {
        match self {
            ChildKind::Card => CARD_STAGGER,
            ChildKind::Timeline => TIMELINE_STAGGER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    Section(usize),
    Child { section: usize, child: usize },
}

/// A reveal step to run `delay` ms from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cascade {
    pub delay: Millis,
    pub step: RevealStep,
}

#[derive(Debug, Default)]
pub struct RevealEngine {
    /// Sections still being watched, in page order.
    observing: Vec<usize>,
}

impl RevealEngine {
    pub fn new(page: &PageModel) -> Self {
        Self {
            observing: page
                .sections
                .iter()
                .filter(|s| !s.revealed())
                .map(|s| s.index)
                .collect(),
        }
    }

    pub fn qualifies(top_in_viewport: f64, viewport_height: f64) -> bool {
        top_in_viewport < viewport_height - REVEAL_MARGIN
    }

    /// Polled check: trigger every watched section that now qualifies.
    pub fn check(&mut self, page: &mut PageModel, scroll_y: f64, viewport_height: f64) -> Vec<Cascade> {
        let due: Vec<usize> = self
            .observing
            .iter()
            .copied()
            .filter(|&i| {
                page.sections
                    .get(i)
                    .is_some_and(|s| Self::qualifies(s.viewport_top(scroll_y), viewport_height))
            })
            .collect();
        due.into_iter()
            .filter_map(|i| self.trigger(page, i))
            .collect()
    }

    /// Trigger one section directly (intersection callback).  `None` when the
    /// section was already revealed.
    pub fn trigger(&mut self, page: &mut PageModel, index: usize) -> Option<Cascade> {
        self.observing.retain(|&i| i != index);
        let section = page.sections.get_mut(index)?;
        if !section.mark_revealed() {
            return None;
        }
        tracing::info!(section = %section.id, "reveal triggered");
        Some(Cascade {
            delay: index as Millis * SECTION_STAGGER,
            step: RevealStep::Section(index),
        })
    }

    /// Apply a step.  Showing a section returns its child cascade.
    pub fn show(page: &mut PageModel, step: RevealStep) -> Vec<Cascade> {
        match step {
            RevealStep::Section(index) => {
                let Some(section) = page.sections.get_mut(index) else {
                    return Vec::new();
                };
                section.visible = true;
                section
                    .children
                    .iter()
                    .enumerate()
                    .map(|(child, item)| Cascade {
                        delay: item.ordinal as Millis * item.kind.stagger(),
                        step: RevealStep::Child { section: index, child },
                    })
                    .collect()
            }
            RevealStep::Child { section, child } => {
                if let Some(item) = page
                    .sections
                    .get_mut(section)
                    .and_then(|s| s.children.get_mut(child))
                {
                    item.visible = true;
                }
                Vec::new()
            }
        }
    }

    pub fn is_observing(&self, index: usize) -> bool {
        self.observing.contains(&index)
    }

    /// Number of sections still watched.
    pub fn observing(&self) -> usize {
        self.observing.len()
    }
}
