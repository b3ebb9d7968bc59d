//! Sending indicator: a small spinner + label drawn while the contact form
//! is submitting.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::clock::Millis;

/// Braille-dot spinner frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MS: Millis = 80;

pub struct SendingIndicator {
    pub visible: bool,
    /// Current clock; drives the frame.
    pub now: Millis,
    pub style: Style,
}

impl SendingIndicator {
    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[(self.now / FRAME_MS) as usize % SPINNER_FRAMES.len()]
    }
}

impl Widget for SendingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible || area.width < 12 || area.height == 0 {
            return;
        }
        let label = format!(" {} Sending... ", self.frame());
        let width = label.chars().count() as u16;
        let line = Line::from(Span::styled(label, self.style));
        buf.set_line(area.x, area.y, &line, width.min(area.width));
    }
}
