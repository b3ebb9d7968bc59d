//! The fixed navigation bar.
//!
//! Brand glyph and title on the left, then the section links, the project
//! filter, the theme toggle and the mobile menu button.  Narrow terminals
//! hide the links unless the menu is open.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::state::{AppState, PX_PER_COL};
use crate::core::nav::MOBILE_BREAKPOINT;

use super::page_widget::render_ripples;
use super::theme::Theme;

const ORBIT_GLYPHS: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// What a nav bar cell does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavHit {
    Link(String),
    Filter,
    Theme,
    Menu,
}

struct Segment {
    text: String,
    hit: Option<NavHit>,
    link: Option<usize>,
}

fn segments(state: &AppState, width: u16) -> Vec<Segment> {
    let rotation = state.orbit_rotations().first().copied().unwrap_or(0.0);
    let glyph = ORBIT_GLYPHS[(rotation.rem_euclid(360.0) / 90.0) as usize % ORBIT_GLYPHS.len()];
    let mut out = vec![Segment {
        text: format!(" {glyph} {} ", state.page.title),
        hit: None,
        link: None,
    }];

    let wide = f64::from(width) * PX_PER_COL > MOBILE_BREAKPOINT;
    if wide || state.nav.menu_open() {
        for (i, link) in state.page.links().iter().enumerate() {
            out.push(Segment {
                text: format!(" {} ", link.label),
                hit: Some(NavHit::Link(link.target.clone())),
                link: Some(i),
            });
        }
    }
    if !state.filter.is_empty() {
        out.push(Segment {
            text: format!(" [{}] ", state.filter.selected()),
            hit: Some(NavHit::Filter),
            link: None,
        });
    }
    out.push(Segment {
        text: format!(" {} ", state.theme().icon()),
        hit: Some(NavHit::Theme),
        link: None,
    });
    if !wide {
        let icon = if state.nav.menu_open() { "✕" } else { "≡" };
        out.push(Segment {
            text: format!(" {icon} "),
            hit: Some(NavHit::Menu),
            link: None,
        });
    }
    out
}

/// Which control sits under column `col` of the nav bar.
pub fn hit_test(state: &AppState, area: Rect, col: u16) -> Option<NavHit> {
    let mut x = area.x;
    for segment in segments(state, area.width) {
        let w = segment.text.chars().count() as u16;
        if col >= x && col < x.saturating_add(w) {
            return segment.hit;
        }
        x = x.saturating_add(w);
    }
    None
}

pub struct NavBar<'a> {
    pub state: &'a AppState,
    pub theme: Theme,
}

impl Widget for NavBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let condensed = self.state.scroll_state().navbar_condensed;
        let base = self.theme.nav_style(condensed);
        buf.set_style(area, base);

        let spans: Vec<Span> = segments(self.state, area.width)
            .into_iter()
            .map(|segment| {
                let style = match segment.link.and_then(|i| self.state.page.links().get(i).map(|l| (i, l))) {
                    Some((i, link)) => self.theme.link_style(link.is_active(), i == self.state.nav.focused()),
                    None => base,
                };
                Span::styled(segment.text, style)
            })
            .collect();
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
        if self.state.effects_on() {
            render_ripples(self.state, self.theme.ripple_style(), area, buf);
        }
    }
}
