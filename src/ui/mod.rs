//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer reads [`AppState`] and turns it into cells on the terminal.
//! It never mutates state and never reads the clock.

pub mod layout;
pub mod nav_bar;
pub mod page_widget;
pub mod spinner;
pub mod theme;

use ratatui::{widgets::Paragraph, Frame};

use crate::app::state::{AppState, Focus};
use layout::AppLayout;
use nav_bar::NavBar;
use page_widget::{PageView, ProgressStrip};
use theme::Theme;

const FORM_HINT: &str = "Tab/Shift+Tab: field  Enter: send  Esc: back to page";

/// Draw one full frame.
pub fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());
    let theme = Theme::of(state.theme());

    frame.render_widget(NavBar { state, theme }, layout.nav_area);
    frame.render_widget(
        ProgressStrip {
            percent: state.scroll_state().progress_percent,
            style: theme.progress_style(),
        },
        layout.progress_area,
    );
    frame.render_widget(PageView { state, theme }, layout.body_area);

    let status = match state.notices.latest() {
        Some(notice) => Paragraph::new(notice.text.as_str()).style(theme.notice_style(notice.kind)),
        None => {
            let hint = match state.focus {
                Focus::Form(_) => FORM_HINT.to_string(),
                Focus::Page => state.config.status_bar_hint(),
            };
            Paragraph::new(hint).style(theme.status_bar_style())
        }
    };
    frame.render_widget(status, layout.status_area);
}
