//! Input handling: maps key/mouse events to state operations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::{effects, page::PageRow};
use crate::shell::launcher;
use crate::ui::layout::AppLayout;
use crate::ui::nav_bar::{self, NavHit};

use super::state::{AppState, Focus, PX_PER_COL};

/// Rows moved per wheel notch.
const WHEEL_ROWS: f64 = 3.0;

/// Process a key event, dispatching on keyboard focus.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, even while typing.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.focus {
        Focus::Page => handle_page_key(state, key),
        Focus::Form(_) => handle_form_key(state, key),
    }
}

// ── page (configurable bindings) ────────────────────────────────

fn handle_page_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Home => return state.scroll_to(0.0),
        KeyCode::End => return state.scroll_to(f64::MAX),
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    let links = state.page.links().len();

    match action {
        Action::ScrollUp => state.scroll_by(-1.0),
        Action::ScrollDown => state.scroll_by(1.0),
        Action::PageUp => state.page_by(-1.0),
        Action::PageDown => state.page_by(1.0),
        Action::PrevLink => state.nav.focus_prev(links),
        Action::NextLink => state.nav.focus_next(links),
        Action::FollowLink => state.follow_focused_link(),
        Action::ToggleTheme => state.toggle_theme(),
        Action::ToggleMenu => state.toggle_menu(),
        Action::CycleFilter => state.cycle_filter(),
        Action::OpenResume => state.open_resume(launcher::open_url),
        Action::FocusForm => state.focus_form(),
        Action::Quit => state.should_quit = true,
    }
}

// ── contact form (raw text entry) ───────────────────────────────

fn handle_form_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.leave_form(),
        KeyCode::Tab | KeyCode::Down => state.form_next_field(),
        KeyCode::BackTab | KeyCode::Up => state.form_prev_field(),
        KeyCode::Enter => state.form_submit(),
        KeyCode::Backspace => state.form_backspace(),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            state.form_type(c);
        }
        _ => {}
    }
}

// ── mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let layout = AppLayout::from_area(state.terminal_area);
    let px_row = state.page.px_per_row();

    match mouse.kind {
        MouseEventKind::ScrollDown => state.scroll_by(WHEEL_ROWS),
        MouseEventKind::ScrollUp => state.scroll_by(-WHEEL_ROWS),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            if point_in_rect(layout.body_area, mouse.column, mouse.row) {
                let x = f64::from(mouse.column - layout.body_area.x) * PX_PER_COL;
                let y = f64::from(mouse.row - layout.body_area.y) * px_row;
                state.pointer_moved(x, y);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            // Ripples are placed in terminal pixels, one row high.
            let y = f64::from(mouse.row) * px_row;
            let element = effects::Rect {
                x: 0.0,
                y,
                w: f64::from(state.terminal_area.width) * PX_PER_COL,
                h: px_row,
            };
            let click = (f64::from(mouse.column) * PX_PER_COL, y + px_row / 2.0);
            state.ripple(element, click);

            if point_in_rect(layout.nav_area, mouse.column, mouse.row) {
                handle_nav_click(state, layout.nav_area, mouse.column);
                return;
            }
            let Some(page_row) = layout.body_row(mouse.row, state.first_row()) else {
                return;
            };

            match state.page.rows().get(page_row) {
                Some(PageRow::FormField { field, .. }) => state.focus = Focus::Form(*field),
                Some(PageRow::FormStatus { .. }) => state.form_submit(),
                _ => state.leave_form(),
            }
        }
        _ => {}
    }
}

fn handle_nav_click(state: &mut AppState, area: ratatui::layout::Rect, col: u16) {
    match nav_bar::hit_test(state, area, col) {
        Some(NavHit::Link(target)) => state.click_link(&target),
        Some(NavHit::Filter) => state.cycle_filter(),
        Some(NavHit::Theme) => state.toggle_theme(),
        Some(NavHit::Menu) => state.toggle_menu(),
        None => {}
    }
}

fn point_in_rect(area: ratatui::layout::Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
