//! Navigation controller: active-link highlighting and click-to-scroll.

use super::page::{PageModel, Section, SectionId};

/// The point below the viewport top that decides the active section.
pub const ACTIVE_PROBE: f64 = 120.0;
/// Space reserved for the fixed header when scrolling to a section.
pub const HEADER_OFFSET: f64 = 80.0;
/// Viewports wider than this never show the collapsed mobile menu.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

/// Index of the one section containing the probe point.  Zero-height
/// sections never qualify; if overlapping sections both contain the probe,
/// the answer is ambiguous and nothing is active.
pub fn resolve_active(sections: &[Section], scroll_y: f64) -> Option<usize> {
    let mut hits = sections.iter().filter(|s| {
        let top = s.viewport_top(scroll_y);
        top <= ACTIVE_PROBE && ACTIVE_PROBE < top + s.span.height
    });
    let first = hits.next()?;
    if hits.next().is_some() {
        return None;
    }
    Some(first.index)
}

/// A request for the host to scroll the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub smooth: bool,
}

#[derive(Debug, Default)]
pub struct NavController {
    menu_open: bool,
    /// Link under keyboard focus in the nav bar.
    focused: usize,
}

impl NavController {
    /// Re-resolve the active section and enforce link exclusivity.
    pub fn sync(&mut self, page: &mut PageModel, scroll_y: f64) -> Option<SectionId> {
        let active = resolve_active(&page.sections, scroll_y).map(|i| page.sections[i].id.clone());
        page.set_active_link(active.as_deref());
        active
    }

    /// Handle a link click: resolve the target and close the mobile menu.
    /// Unknown targets are ignored and leave the menu as it was.
    pub fn click(&mut self, page: &PageModel, target: &str) -> Option<ScrollRequest> {
        let section = page.section(target)?;
        self.close_menu();
        Some(ScrollRequest {
            top: section.span.top - HEADER_OFFSET,
            smooth: true,
        })
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    /// Settled resize: wide viewports never keep the mobile menu open.
    pub fn on_resize(&mut self, viewport_width: f64) {
        if viewport_width > MOBILE_BREAKPOINT {
            self.close_menu();
        }
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn focus_next(&mut self, links: usize) {
        if links > 0 {
            self.focused = (self.focused + 1) % links;
        }
    }

    pub fn focus_prev(&mut self, links: usize) {
        if links > 0 {
            self.focused = (self.focused + links - 1) % links;
        }
    }

    pub fn focus(&mut self, index: usize) {
        self.focused = index;
    }
}
