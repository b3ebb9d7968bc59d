//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Fixed nav bar, scroll progress strip, page body and status bar.
pub struct AppLayout {
    pub nav_area: Rect,
    pub progress_area: Rect,
    pub body_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // nav bar
                Constraint::Length(1), // progress strip
                Constraint::Min(1),    // page body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            nav_area: chunks[0],
            progress_area: chunks[1],
            body_area: chunks[2],
            status_area: chunks[3],
        }
    }

    /// Page row under screen row `row`, given the first visible page row.
    pub fn body_row(&self, row: u16, first_row: usize) -> Option<usize> {
        let top = self.body_area.y;
        (row >= top && row < top.saturating_add(self.body_area.height))
            .then(|| first_row + usize::from(row - top))
    }
}
