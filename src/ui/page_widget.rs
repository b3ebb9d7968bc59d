//! Page body: the laid-out rows under the current scroll offset, plus the
//! pointer and particle overlays.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::state::{AppState, Focus, PX_PER_COL};
use crate::core::{
    effects::RIPPLE_LIFETIME,
    form::{FieldTone, FormNotice, FormPhase},
    page::{CardDisplay, ChildKind, PageRow},
};

use super::spinner::SendingIndicator;
use super::theme::Theme;

const BAR_WIDTH: usize = 24;

pub struct PageView<'a> {
    pub state: &'a AppState,
    pub theme: Theme,
}

impl PageView<'_> {
    fn row_line(&self, row: PageRow) -> Line<'_> {
        let state = self.state;
        let theme = &self.theme;
        let section_visible = |s: usize| state.page.sections.get(s).is_some_and(|s| s.visible);

        match row {
            PageRow::Blank => Line::default(),
            // The first section carries the page title, word by word.
            PageRow::Heading { section: 0 } if section_visible(0) => {
                let mut spans = vec![Span::styled("# ", theme.heading_style())];
                for (i, (word, shown)) in state.name.parts().enumerate() {
                    if i > 0 {
                        spans.push(Span::raw(" "));
                    }
                    let text = if shown { word.to_string() } else { " ".repeat(word.chars().count()) };
                    spans.push(Span::styled(text, theme.heading_style()));
                }
                Line::from(spans)
            }
            PageRow::Heading { section } if section_visible(section) => {
                let title = &state.page.sections[section].title;
                Line::from(Span::styled(format!("## {title}"), theme.heading_style()))
            }
            PageRow::Text { section, line } if section_visible(section) => {
                let text = state.page.sections[section].body.get(line).map_or("", String::as_str);
                Line::from(Span::styled(text.to_string(), theme.text_style()))
            }
            PageRow::Tagline { section } if section_visible(section) => {
                let now = state.now();
                let mut spans = vec![Span::styled(
                    state.typewriter.shown(now).to_string(),
                    theme.text_style(),
                )];
                if !state.typewriter.is_done(now) {
                    spans.push(Span::styled("▌", theme.role_style()));
                }
                Line::from(spans)
            }
            PageRow::Roles { section } if section_visible(section) => match state.carousel.active_label() {
                Some(role) => Line::from(Span::styled(format!("  {role}"), theme.role_style())),
                None => Line::default(),
            },
            PageRow::Stat { section, stat } if section_visible(section) => {
                let Some(counter) = state.stats.counters().get(stat) else {
                    return Line::default();
                };
                Line::from(vec![
                    Span::styled(format!("  {:>8}  ", counter.current()), theme.role_style()),
                    Span::styled(counter.label.clone(), theme.text_style()),
                ])
            }
            PageRow::Skill { section, skill } if section_visible(section) => {
                let Some(bar) = state.skills.bars().get(skill) else {
                    return Line::default();
                };
                let fill = bar.fill().unwrap_or(0);
                let filled = BAR_WIDTH * usize::from(fill) / 100;
                Line::from(vec![
                    Span::styled(format!("  {:<16}", bar.label), theme.text_style()),
                    Span::styled("█".repeat(filled), theme.bar_style()),
                    Span::styled("░".repeat(BAR_WIDTH - filled), theme.hidden_style()),
                    Span::styled(format!(" {fill:>3}%"), theme.text_style()),
                ])
            }
            PageRow::ChildTitle { section, child } if section_visible(section) => {
                let Some(item) = state.page.sections[section].children.get(child) else {
                    return Line::default();
                };
                if !item.visible {
                    return Line::default();
                }
                let marker = match item.kind {
                    ChildKind::Card => "▸",
                    ChildKind::Timeline => "●",
                };
                let style = match item.display {
                    CardDisplay::Shown => theme.heading_style(),
                    CardDisplay::FadingIn | CardDisplay::FadingOut => theme.fading_style(),
                    CardDisplay::Removed => theme.hidden_style(),
                };
                let mut spans = vec![Span::styled(format!("  {marker} {}", item.title), style)];
                if let Some(category) = &item.category {
                    spans.push(Span::styled(format!("  ({category})"), theme.hidden_style()));
                }
                Line::from(spans)
            }
            PageRow::ChildText { section, child, line } if section_visible(section) => {
                let Some(item) = state.page.sections[section].children.get(child) else {
                    return Line::default();
                };
                if !item.visible {
                    return Line::default();
                }
                let style = if item.display == CardDisplay::Shown {
                    theme.text_style()
                } else {
                    theme.fading_style()
                };
                let text = item.lines.get(line).map_or("", String::as_str);
                Line::from(Span::styled(format!("    {text}"), style))
            }
            PageRow::FormField { section, field } if section_visible(section) => {
                let Some(f) = state.form.fields().get(field) else {
                    return Line::default();
                };
                let focused = state.focus == Focus::Form(field);
                let mut spans = vec![
                    Span::styled(format!("  {:<9}", format!("{}:", f.label)), theme.text_style()),
                    Span::styled(format!(" {}", f.value()), theme.field_style(f.tone(), focused)),
                ];
                if focused {
                    spans.push(Span::styled("▌", theme.role_style()));
                }
                if let Some(message) = f.visible_message() {
                    spans.push(Span::styled(format!("  {message}"), theme.field_style(f.tone(), false)));
                }
                Line::from(spans)
            }
            PageRow::FormStatus { section } if section_visible(section) => match state.form.notice() {
                Some(FormNotice::Error(text)) => Line::from(Span::styled(
                    format!("  {text}"),
                    theme.field_style(FieldTone::Invalid, false),
                )),
                Some(FormNotice::Success(text)) => {
                    let style = if *state.form.phase() == FormPhase::Resetting {
                        theme.fading_style()
                    } else {
                        theme.field_style(FieldTone::Valid, false)
                    };
                    Line::from(Span::styled(format!("  {text}"), style))
                }
                None if state.form.phase().is_editable() => {
                    Line::from(Span::styled("  [ Send Message ]", theme.heading_style()))
                }
                None => Line::default(),
            },
            _ => Line::default(),
        }
    }

    fn render_particles(&self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let (_, height) = state.particles.bounds();
        if height <= 0.0 {
            return;
        }
        let px_row = state.page.px_per_row();
        let shift = state.scroll_state().parallax_offset;
        for p in state.particles.particles() {
            let col = (p.x / PX_PER_COL) as u16;
            let row = ((p.y - shift).rem_euclid(height) / px_row) as u16;
            if col >= area.width || row >= area.height {
                continue;
            }
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                if cell.symbol() == " " {
                    cell.set_symbol("·").set_style(self.theme.particle_style());
                }
            }
        }
    }

    fn render_pointer(&self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let px_row = state.page.px_per_row();
        render_ripples(state, self.theme.ripple_style(), area, buf);

        let (fx, fy) = state.follower.follower;
        let (col, row) = ((fx / PX_PER_COL) as u16, (fy / px_row) as u16);
        if col < area.width && row < area.height {
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_style(self.theme.follower_style()).set_symbol("◦");
            }
        }
    }
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base());
        let state = self.state;
        let first = state.first_row();

        for (i, row) in state.page.rows().iter().skip(first).take(area.height as usize).enumerate() {
            let y = area.y + i as u16;
            let line = self.row_line(*row);
            buf.set_line(area.x, y, &line, area.width);

            if matches!(row, PageRow::FormStatus { .. }) && *state.form.phase() == FormPhase::Submitting {
                SendingIndicator {
                    visible: true,
                    now: state.now(),
                    style: self.theme.role_style(),
                }
                .render(Rect::new(area.x + 2, y, area.width.saturating_sub(2), 1), buf);
            }
        }

        if state.effects_on() {
            self.render_particles(area, buf);
            self.render_pointer(area, buf);
        }
    }
}

/// Draw the live ripples whose row lies inside `area`.  Ripple rects are in
/// terminal pixels, so the nav bar and the body share them.
pub fn render_ripples(state: &AppState, style: Style, area: Rect, buf: &mut Buffer) {
    let px_row = state.page.px_per_row();
    let now = state.now();
    for (element, ripple) in state.ripples.live() {
        let row = (element.y / px_row) as u16;
        if row < area.y || row >= area.bottom() {
            continue;
        }
        let age = now.saturating_sub(ripple.born) as f64 / RIPPLE_LIFETIME as f64;
        let centre = element.x + ripple.left + ripple.size / 2.0;
        let reach = ripple.size / 2.0 * age.min(1.0);
        let from = (((centre - reach).max(element.x) / PX_PER_COL) as u16).max(area.x);
        let to = (((centre + reach).min(element.x + element.w) / PX_PER_COL) as u16).min(area.right());
        if to > from {
            buf.set_style(Rect::new(from, row, to - from, 1), style);
        }
    }
}

/// One-row scroll progress strip.
pub struct ProgressStrip {
    pub percent: f64,
    pub style: Style,
}

impl Widget for ProgressStrip {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let filled = (f64::from(area.width) * self.percent.clamp(0.0, 100.0) / 100.0).round() as usize;
        let line = Line::from(Span::styled("━".repeat(filled), self.style));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::{observe::VisibilityMode, page::PageSpec, theme::MemoryStore};
    use ratatui::style::Color;

    // Rows: title, roles, blank | Skills, Rust bar, c0, c1, blank.
    const PAGE: &str = r#"{
        "title": "Ada Lovelace",
        "roles": ["analyst", "poet"],
        "sections": [
            {"id": "home", "roles": true},
            {"id": "skills", "title": "Skills",
             "skills": [{"label": "Rust", "percent": 50}],
             "cards": [{"title": "c0"}, {"title": "c1"}]}
        ]
    }"#;

    /// 96 columns keeps the viewport at 768 px, so no overlays are drawn.
    fn state() -> AppState {
        let spec = PageSpec::from_json(PAGE).unwrap();
        let config = AppConfig {
            visibility: VisibilityMode::FixedDelay,
            ..AppConfig::default()
        };
        let mut state = AppState::new(&spec, config, Box::new(MemoryStore::default()), Vec::new());
        state.boot(Rect::new(0, 0, 96, 23));
        state
    }

    fn rows(state: &AppState) -> Vec<String> {
        let area = Rect::new(0, 0, 96, 9);
        let mut buf = Buffer::empty(area);
        PageView {
            state,
            theme: Theme::of(state.theme()),
        }
        .render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                let row: String = (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect();
                row.trim_end().to_string()
            })
            .collect()
    }

    #[test]
    fn sections_stay_blank_until_their_reveal_step() {
        let mut state = state();
        assert!(rows(&state).iter().all(String::is_empty));

        state.advance(1000);
        let shown = rows(&state);
        assert_eq!(shown[0], "# Ada");
        assert_eq!(shown[3], "");

        state.advance(1199);
        assert_eq!(rows(&state)[0], "# Ada Lovelace");
        assert_eq!(rows(&state)[3], "");

        state.advance(1200);
        let shown = rows(&state);
        assert_eq!(shown[3], "## Skills");
        assert_eq!(shown[5], "  ▸ c0");
        assert_eq!(shown[6], "");

        state.advance(1350);
        assert_eq!(rows(&state)[6], "  ▸ c1");
    }

    #[test]
    fn skill_bar_shows_an_empty_track_until_filled() {
        let mut state = state();
        state.advance(1299);
        let track = format!("  {:<16}{}   0%", "Rust", "░".repeat(BAR_WIDTH));
        assert_eq!(rows(&state)[4], track);

        state.advance(1300);
        let half = BAR_WIDTH / 2;
        let filled = format!("  {:<16}{}{}  50%", "Rust", "█".repeat(half), "░".repeat(half));
        assert_eq!(rows(&state)[4], filled);
    }

    #[test]
    fn ripples_are_drawn_by_the_area_that_holds_their_row() {
        let mut state = state();
        let element = crate::core::effects::Rect {
            x: 0.0,
            y: 0.0,
            w: 96.0 * PX_PER_COL,
            h: 16.0,
        };
        state.ripples.spawn(element, (384.0, 8.0), 0);
        state.advance(300);

        let style = Style::default().bg(Color::Red);
        let mut buf = Buffer::empty(Rect::new(0, 0, 96, 3));
        render_ripples(&state, style, Rect::new(0, 0, 96, 1), &mut buf);
        render_ripples(&state, style, Rect::new(0, 2, 96, 1), &mut buf);
        let red: Vec<(u16, u16)> = (0..3)
            .flat_map(|y| (0..96).map(move |x| (x, y)))
            .filter(|&(x, y)| buf[(x, y)].bg == Color::Red)
            .collect();
        assert_eq!(red.first(), Some(&(24, 0)));
        assert_eq!(red.last(), Some(&(71, 0)));
        assert_eq!(red.len(), 48);
    }

    #[test]
    fn role_row_shows_only_the_active_role() {
        let mut state = state();
        state.advance(1000);
        assert_eq!(rows(&state)[1], "  analyst");
        state.advance(4000);
        assert_eq!(rows(&state)[1], "");
        state.advance(4299);
        assert_eq!(rows(&state)[1], "");
        state.advance(4300);
        assert_eq!(rows(&state)[1], "  poet");
    }

    #[test]
    fn progress_strip_fills_proportionally() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        ProgressStrip {
            percent: 50.0,
            style: Style::default(),
        }
        .render(area, &mut buf);
        let row: String = (0..10).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(row, "━━━━━     ");
    }
}
