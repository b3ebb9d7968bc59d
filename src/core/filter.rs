//! Project filter: show the cards of one category, hide the rest.
//!
//! Selecting a category plans a set of timed steps.  Every plan carries a
//! generation number; steps from an older plan are dropped when they fire,
//! so a quick second selection never resurrects a card the first one hid.

use super::clock::Millis;
use super::page::{CardDisplay, ChildKind, PageModel};

pub const ALL: &str = "all";
/// Stagger between matching cards, by position among all filterable cards.
pub const SHOW_STAGGER: Millis = 100;
pub const FADE_IN: Millis = 50;
pub const HIDE_AFTER: Millis = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Back into the layout, starting to fade in.
    Show,
    /// Fade-in complete.
    Settle,
    /// Fade-out complete: out of the layout.
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStep {
    pub generation: u64,
    pub section: usize,
    pub child: usize,
    pub action: FilterAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTimer {
    pub delay: Millis,
    pub step: FilterStep,
}

#[derive(Debug, Clone)]
pub struct ProjectFilter {
    categories: Vec<String>,
    selected: usize,
    /// (section, child) of every card that carries a category.
    cards: Vec<(usize, usize)>,
    generation: u64,
}

impl ProjectFilter {
    pub fn new(page: &PageModel) -> Self {
        let mut categories = vec![ALL.to_string()];
        let mut cards = Vec::new();
        for (s, section) in page.sections.iter().enumerate() {
            for (c, item) in section.children.iter().enumerate() {
                let Some(category) = item.category.as_ref().filter(|_| item.kind == ChildKind::Card) else {
                    continue;
                };
                cards.push((s, c));
                if !categories.contains(category) {
                    categories.push(category.clone());
                }
            }
        }
        Self {
            categories,
            selected: 0,
            cards,
            generation: 0,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn selected(&self) -> &str {
        &self.categories[self.selected]
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Select the next category (wrapping) and plan it.
    pub fn cycle(&mut self, page: &mut PageModel) -> Vec<FilterTimer> {
        let next = (self.selected + 1) % self.categories.len();
        self.select(page, next)
    }

    /// Select category `index`.  Non-matching cards start fading out at
    /// once; everything else is returned as timed steps.
    pub fn select(&mut self, page: &mut PageModel, index: usize) -> Vec<FilterTimer> {
        if index >= self.categories.len() {
            return Vec::new();
        }
        self.selected = index;
        self.generation += 1;
        let wanted = &self.categories[index];
        tracing::debug!(category = %wanted, generation = self.generation, "filter selected");

        let mut timers = Vec::new();
        for (position, &(section, child)) in self.cards.iter().enumerate() {
            let Some(item) = page.sections.get_mut(section).and_then(|s| s.children.get_mut(child)) else {
                continue;
            };
            let matches = wanted == ALL || item.category.as_ref() == Some(wanted);
            let (delay, action) = if matches {
                (position as Millis * SHOW_STAGGER, FilterAction::Show)
            } else {
                item.display = CardDisplay::FadingOut;
                (HIDE_AFTER, FilterAction::Remove)
            };
            timers.push(FilterTimer {
                delay,
                step: FilterStep {
                    generation: self.generation,
                    section,
                    child,
                    action,
                },
            });
        }
        timers
    }

    /// Run a step.  Returns follow-up timers and whether the layout changed.
    pub fn apply(&self, page: &mut PageModel, step: FilterStep) -> (Vec<FilterTimer>, bool) {
        if step.generation != self.generation {
            return (Vec::new(), false);
        }
        let Some(item) = page
            .sections
            .get_mut(step.section)
            .and_then(|s| s.children.get_mut(step.child))
        else {
            return (Vec::new(), false);
        };
        match step.action {
            FilterAction::Show => {
                let relayout = item.display == CardDisplay::Removed;
                item.display = CardDisplay::FadingIn;
                let settle = FilterTimer {
                    delay: FADE_IN,
                    step: FilterStep {
                        action: FilterAction::Settle,
                        ..step
                    },
                };
                (vec![settle], relayout)
            }
            FilterAction::Settle => {
                if item.display == CardDisplay::FadingIn {
                    item.display = CardDisplay::Shown;
                }
                (Vec::new(), false)
            }
            FilterAction::Remove => {
                let relayout = item.display == CardDisplay::FadingOut;
                if relayout {
                    item.display = CardDisplay::Removed;
                }
                (Vec::new(), relayout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::PageSpec;

    fn projects() -> PageModel {
        let json = r#"{"title":"x","sections":[{"id":"p","cards":[
            {"title":"a","category":"web"},
            {"title":"b","category":"ml"},
            {"title":"c","category":"web"},
            {"title":"d"}]}]}"#;
        PageModel::build(&PageSpec::from_json(json).unwrap(), 10.0)
    }

    fn display(page: &PageModel) -> Vec<CardDisplay> {
        page.sections[0].children.iter().map(|c| c.display).collect()
    }

    #[test]
    fn categories_in_first_appearance_order() {
        let page = projects();
        let filter = ProjectFilter::new(&page);
        assert_eq!(filter.categories(), ["all", "web", "ml"]);
        assert_eq!(filter.selected(), "all");
    }

    #[test]
    fn select_plans_staggered_show_and_delayed_remove() {
        let mut page = projects();
        let mut filter = ProjectFilter::new(&page);
        let timers = filter.select(&mut page, 1);
        let plan: Vec<(Millis, usize, FilterAction)> =
            timers.iter().map(|t| (t.delay, t.step.child, t.step.action)).collect();
        assert_eq!(
            plan,
            vec![
                (0, 0, FilterAction::Show),
                (300, 1, FilterAction::Remove),
                (200, 2, FilterAction::Show),
            ]
        );
        assert_eq!(display(&page)[1], CardDisplay::FadingOut);

        let (follow, relayout) = filter.apply(&mut page, timers[1].step);
        assert!(follow.is_empty());
        assert!(relayout);
        assert_eq!(display(&page)[1], CardDisplay::Removed);

        let (follow, _) = filter.apply(&mut page, timers[0].step);
        assert_eq!(follow[0].delay, FADE_IN);
        assert_eq!(display(&page)[0], CardDisplay::FadingIn);
        filter.apply(&mut page, follow[0].step);
        assert_eq!(display(&page)[0], CardDisplay::Shown);
        // uncategorised cards are never touched
        assert_eq!(display(&page)[3], CardDisplay::Shown);
    }

    #[test]
    fn stale_steps_are_dropped() {
        let mut page = projects();
        let mut filter = ProjectFilter::new(&page);
        let first = filter.select(&mut page, 2);
        filter.select(&mut page, 0);
        let remove_a = first.iter().find(|t| t.step.child == 0).unwrap();
        assert_eq!(filter.apply(&mut page, remove_a.step), (Vec::new(), false));
        assert_ne!(display(&page)[0], CardDisplay::Removed);
    }

    #[test]
    fn cycle_wraps() {
        let mut page = projects();
        let mut filter = ProjectFilter::new(&page);
        for expected in ["web", "ml", "all"] {
            filter.cycle(&mut page);
            assert_eq!(filter.selected(), expected);
        }
    }
}
