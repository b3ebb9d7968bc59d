//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::{form::FieldTone, notice::NoticeKind, theme::ThemePreference};

/// Central theme: one palette per preference; styles are derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    highlight: Color,
    chrome: Color,
}

impl Theme {
    pub fn of(pref: ThemePreference) -> Self {
        match pref {
            ThemePreference::Dark => Self {
                bg: Color::Reset,
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::Yellow,
                chrome: Color::DarkGray,
            },
            ThemePreference::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                highlight: Color::Magenta,
                chrome: Color::Gray,
            },
        }
    }

    // ── page body ──────────────────────────────────────────────
    pub fn base(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn heading_style(&self) -> Style {
        self.base().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        self.base()
    }

    /// Content still waiting for its reveal.
    pub fn hidden_style(&self) -> Style {
        self.base().fg(self.muted).add_modifier(Modifier::DIM)
    }

    pub fn fading_style(&self) -> Style {
        self.base().fg(self.muted)
    }

    pub fn role_style(&self) -> Style {
        self.base().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn bar_style(&self) -> Style {
        self.base().fg(self.accent)
    }

    pub fn particle_style(&self) -> Style {
        self.base().fg(self.muted)
    }

    pub fn ripple_style(&self) -> Style {
        Style::default().bg(self.chrome)
    }

    pub fn follower_style(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    pub fn field_style(&self, tone: FieldTone, focused: bool) -> Style {
        let style = match tone {
            FieldTone::Neutral => self.base(),
            FieldTone::Valid => self.base().fg(Color::Green),
            FieldTone::Invalid => self.base().fg(Color::Red),
        };
        if focused {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn nav_style(&self, condensed: bool) -> Style {
        let style = Style::default().bg(self.chrome).fg(self.fg);
        if condensed {
            style
        } else {
            style.add_modifier(Modifier::BOLD)
        }
    }

    pub fn link_style(&self, active: bool, focused: bool) -> Style {
        let mut style = Style::default().bg(self.chrome).fg(self.fg);
        if active {
            style = style.fg(self.highlight).add_modifier(Modifier::BOLD);
        }
        if focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }

    pub fn progress_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.chrome).fg(self.fg)
    }

    pub fn notice_style(&self, kind: NoticeKind) -> Style {
        let fg = match kind {
            NoticeKind::Info => self.accent,
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        Style::default().bg(self.chrome).fg(fg).add_modifier(Modifier::BOLD)
    }
}
