//! Page snapshot: sections, nav links, and the flat row layout.
//!
//! A [`PageSpec`] is the declarative description loaded from JSON.
//! [`PageModel`] is the live snapshot built from it once: every section gets
//! a document-space [`Span`] derived from its rows, every section gets one
//! [`NavLink`], and the rest of the engine works on this model instead of
//! asking the renderer where things are.  Layout is recomputed only at
//! explicit re-sync points ([`PageModel::relayout`]).

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::form::STANDARD_FIELDS;

/// Built-in page used when no `--page` file is given.
pub const DEFAULT_PAGE: &str = include_str!("../../assets/portfolio.json");

/// Document pixels per terminal row.
pub const DEFAULT_PX_PER_ROW: f64 = 16.0;

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read page description {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse page description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("page description has no sections")]
    Empty,
    #[error("duplicate section id `{0}`")]
    DuplicateId(String),
    #[error("skill `{label}` has percentage {percent}; expected 0-100")]
    SkillRange { label: String, percent: u8 },
}

// ───────────────────────────────────────── description ───────

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpec {
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub sections: Vec<SectionSpec>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub contact_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub tagline: bool,
    #[serde(default)]
    pub roles: bool,
    #[serde(default)]
    pub stats: Vec<StatSpec>,
    #[serde(default)]
    pub skills: Vec<SkillSpec>,
    #[serde(default)]
    pub cards: Vec<CardSpec>,
    #[serde(default)]
    pub timeline: Vec<CardSpec>,
    #[serde(default)]
    pub contact_form: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatSpec {
    pub label: String,
    pub target: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillSpec {
    pub label: String,
    pub percent: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardSpec {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl PageSpec {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        let spec: PageSpec = serde_json::from_str(json)?;
        spec.check()?;
        Ok(spec)
    }

    pub fn load(path: &Path) -> Result<Self, PageError> {
        let json = std::fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn check(&self) -> Result<(), PageError> {
        if self.sections.is_empty() {
            return Err(PageError::Empty);
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(PageError::DuplicateId(section.id.clone()));
            }
            if let Some(skill) = section.skills.iter().find(|s| s.percent > 100) {
                return Err(PageError::SkillRange {
                    label: skill.label.clone(),
                    percent: skill.percent,
                });
            }
        }
        Ok(())
    }

    /// All stat counters in page order.
    pub fn stats(&self) -> impl Iterator<Item = &StatSpec> {
        self.sections.iter().flat_map(|s| s.stats.iter())
    }

    /// All skill bars in page order.
    pub fn skills(&self) -> impl Iterator<Item = &SkillSpec> {
        self.sections.iter().flat_map(|s| s.skills.iter())
    }
}

// ───────────────────────────────────────── geometry ──────────

/// Vertical extent in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Half-open containment: `top <= y < bottom`.
    pub fn contains(&self, y: f64) -> bool {
        self.top <= y && y < self.bottom()
    }

    /// Does a non-empty span overlap the window `[top, top + height)`?
    pub fn intersects(&self, top: f64, height: f64) -> bool {
        self.height > 0.0 && self.top < top + height && self.bottom() > top
    }
}

// ───────────────────────────────────────── model ─────────────

pub type SectionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Card,
    Timeline,
}

/// Display state of a card under the project filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardDisplay {
    #[default]
    Shown,
    FadingIn,
    FadingOut,
    /// Taken out of the layout entirely.
    Removed,
}

/// A card or timeline entry inside a section.
#[derive(Debug, Clone)]
pub struct ChildItem {
    pub kind: ChildKind,
    /// Position among siblings of the same kind; drives the reveal stagger.
    pub ordinal: usize,
    pub title: String,
    pub category: Option<String>,
    pub lines: Vec<String>,
    pub visible: bool,
    pub display: CardDisplay,
}

/// Which optional blocks a section renders, by global index.
#[derive(Debug, Clone, Default)]
pub struct SectionBlocks {
    pub tagline: bool,
    pub roles: bool,
    pub stats: Vec<usize>,
    pub skills: Vec<usize>,
    pub form: bool,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub index: usize,
    pub span: Span,
    pub body: Vec<String>,
    pub blocks: SectionBlocks,
    pub children: Vec<ChildItem>,
    /// Set once the section itself has faded in.
    pub visible: bool,
    revealed: bool,
}

impl Section {
    /// Whether the reveal cascade has been triggered.  One-way.
    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// Flip the revealed flag.  Returns `true` only on the first call.
    pub(crate) fn mark_revealed(&mut self) -> bool {
        !std::mem::replace(&mut self.revealed, true)
    }

    /// Top edge relative to the viewport (the "bounding box" top).
    pub fn viewport_top(&self, scroll_y: f64) -> f64 {
        self.span.top - scroll_y
    }
}

#[derive(Debug, Clone)]
pub struct NavLink {
    pub target: SectionId,
    pub label: String,
    active: bool,
}

impl NavLink {
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Regions whose first appearance in the viewport triggers a one-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Roles,
    Stats,
    Skill(usize),
}

/// One terminal row of the laid-out page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRow {
    Heading { section: usize },
    Text { section: usize, line: usize },
    Tagline { section: usize },
    Roles { section: usize },
    Stat { section: usize, stat: usize },
    Skill { section: usize, skill: usize },
    ChildTitle { section: usize, child: usize },
    ChildText { section: usize, child: usize, line: usize },
    FormField { section: usize, field: usize },
    FormStatus { section: usize },
    Blank,
}

#[derive(Debug, Clone)]
pub struct PageModel {
    pub title: String,
    pub tagline: Option<String>,
    pub sections: Vec<Section>,
    links: Vec<NavLink>,
    rows: Vec<PageRow>,
    px_per_row: f64,
}

impl PageModel {
    pub fn build(spec: &PageSpec, px_per_row: f64) -> Self {
        let mut next_stat = 0;
        let mut next_skill = 0;
        let mut sections = Vec::with_capacity(spec.sections.len());

        for (index, s) in spec.sections.iter().enumerate() {
            let stats: Vec<usize> = (next_stat..next_stat + s.stats.len()).collect();
            next_stat += s.stats.len();
            let skills: Vec<usize> = (next_skill..next_skill + s.skills.len()).collect();
            next_skill += s.skills.len();

            let cards = s.cards.iter().enumerate().map(|(i, c)| child(ChildKind::Card, i, c));
            let timeline = s
                .timeline
                .iter()
                .enumerate()
                .map(|(i, c)| child(ChildKind::Timeline, i, c));

            sections.push(Section {
                id: s.id.clone(),
                title: s.title.clone().unwrap_or_else(|| s.id.clone()),
                index,
                span: Span::default(),
                body: s.lines.clone(),
                blocks: SectionBlocks {
                    tagline: s.tagline,
                    roles: s.roles,
                    stats,
                    skills,
                    form: s.contact_form,
                },
                children: cards.chain(timeline).collect(),
                visible: false,
                revealed: false,
            });
        }

        let links = sections
            .iter()
            .map(|s| NavLink {
                target: s.id.clone(),
                label: s.title.clone(),
                active: false,
            })
            .collect();

        let mut model = Self {
            title: spec.title.clone(),
            tagline: spec.tagline.clone(),
            sections,
            links,
            rows: Vec::new(),
            px_per_row: px_per_row.max(1.0),
        };
        model.relayout();
        model
    }

    /// Rebuild the row list and every section span from current state.
    pub fn relayout(&mut self) {
        let mut rows = Vec::new();
        for (s, section) in self.sections.iter_mut().enumerate() {
            let start = rows.len();
            rows.push(PageRow::Heading { section: s });
            rows.extend((0..section.body.len()).map(|line| PageRow::Text { section: s, line }));
            if section.blocks.tagline {
                rows.push(PageRow::Tagline { section: s });
            }
            if section.blocks.roles {
                rows.push(PageRow::Roles { section: s });
            }
            rows.extend(section.blocks.stats.iter().map(|&stat| PageRow::Stat { section: s, stat }));
            rows.extend(
                section
                    .blocks
                    .skills
                    .iter()
                    .map(|&skill| PageRow::Skill { section: s, skill }),
            );
            for (c, item) in section.children.iter().enumerate() {
                if item.display == CardDisplay::Removed {
                    continue;
                }
                rows.push(PageRow::ChildTitle { section: s, child: c });
                rows.extend((0..item.lines.len()).map(|line| PageRow::ChildText {
                    section: s,
                    child: c,
                    line,
                }));
            }
            if section.blocks.form {
                rows.extend((0..STANDARD_FIELDS.len()).map(|field| PageRow::FormField { section: s, field }));
                rows.push(PageRow::FormStatus { section: s });
            }
            rows.push(PageRow::Blank);

            section.span = Span::new(
                start as f64 * self.px_per_row,
                (rows.len() - start) as f64 * self.px_per_row,
            );
        }
        self.rows = rows;
    }

    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    pub fn px_per_row(&self) -> f64 {
        self.px_per_row
    }

    pub fn document_height(&self) -> f64 {
        self.rows.len() as f64 * self.px_per_row
    }

    pub fn row_span(&self, row: usize) -> Span {
        Span::new(row as f64 * self.px_per_row, self.px_per_row)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Spans of every one-shot region, in layout order.
    pub fn regions(&self) -> Vec<(Region, Span)> {
        let mut out: Vec<(Region, Span)> = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            let span = self.row_span(i);
            match *row {
                PageRow::Roles { .. } => out.push((Region::Roles, span)),
                PageRow::Skill { skill, .. } => out.push((Region::Skill(skill), span)),
                PageRow::Stat { .. } => {
                    // All counters form one block.
                    match out.iter_mut().find(|(r, _)| *r == Region::Stats) {
                        Some((_, block)) => block.height = span.bottom() - block.top,
                        None => out.push((Region::Stats, span)),
                    }
                }
                _ => {}
            }
        }
        out
    }

    // ── nav links ──────────────────────────────────────────────

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Clear every link, then activate the one targeting `id`.
    pub fn set_active_link(&mut self, id: Option<&str>) {
        for link in &mut self.links {
            link.active = Some(link.target.as_str()) == id;
        }
    }

    pub fn active_link(&self) -> Option<&NavLink> {
        self.links.iter().find(|l| l.active)
    }
}

fn child(kind: ChildKind, ordinal: usize, spec: &CardSpec) -> ChildItem {
    ChildItem {
        kind,
        ordinal,
        title: spec.title.clone(),
        category: spec.category.clone(),
        lines: spec.lines.clone(),
        visible: false,
        display: CardDisplay::Shown,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Sections of fixed heights (in rows), no optional blocks.
    pub(crate) fn page_with_heights(rows: &[usize]) -> PageModel {
        let sections = rows
            .iter()
            .enumerate()
            .map(|(i, &n)| SectionSpec {
                id: format!("s{i}"),
                title: None,
                // heading + blank take two rows
                lines: vec![String::new(); n.saturating_sub(2)],
                tagline: false,
                roles: false,
                stats: Vec::new(),
                skills: Vec::new(),
                cards: Vec::new(),
                timeline: Vec::new(),
                contact_form: false,
            })
            .collect();
        let spec = PageSpec {
            title: "t".into(),
            tagline: None,
            roles: Vec::new(),
            sections,
            resume_url: None,
            contact_endpoint: None,
        };
        PageModel::build(&spec, 10.0)
    }

    #[test]
    fn default_page_parses() {
        let spec = PageSpec::from_json(DEFAULT_PAGE).unwrap();
        assert!(!spec.sections.is_empty());
        assert!(!spec.roles.is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"{"title":"x","sections":[{"id":"a"},{"id":"a"}]}"#;
        assert!(matches!(PageSpec::from_json(json), Err(PageError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn rejects_empty_and_out_of_range() {
        assert!(matches!(
            PageSpec::from_json(r#"{"title":"x","sections":[]}"#),
            Err(PageError::Empty)
        ));
        let json = r#"{"title":"x","sections":[{"id":"a","skills":[{"label":"Rust","percent":120}]}]}"#;
        assert!(matches!(PageSpec::from_json(json), Err(PageError::SkillRange { percent: 120, .. })));
    }

    #[test]
    fn spans_tile_the_document() {
        let page = page_with_heights(&[5, 3, 8]);
        let spans: Vec<Span> = page.sections.iter().map(|s| s.span).collect();
        assert_eq!(spans[0], Span::new(0.0, 50.0));
        assert_eq!(spans[1], Span::new(50.0, 30.0));
        assert_eq!(spans[2], Span::new(80.0, 80.0));
        assert_eq!(page.document_height(), 160.0);
    }

    #[test]
    fn child_ordinals_restart_per_kind() {
        let json = r#"{"title":"x","sections":[{"id":"a",
            "cards":[{"title":"c0"},{"title":"c1"}],
            "timeline":[{"title":"t0"}]}]}"#;
        let page = PageModel::build(&PageSpec::from_json(json).unwrap(), 16.0);
        let ords: Vec<(ChildKind, usize)> =
            page.sections[0].children.iter().map(|c| (c.kind, c.ordinal)).collect();
        assert_eq!(
            ords,
            vec![(ChildKind::Card, 0), (ChildKind::Card, 1), (ChildKind::Timeline, 0)]
        );
    }

    #[test]
    fn removed_cards_leave_the_layout() {
        let json = r#"{"title":"x","sections":[{"id":"a","cards":[{"title":"c0","lines":["l"]}]}]}"#;
        let mut page = PageModel::build(&PageSpec::from_json(json).unwrap(), 16.0);
        let before = page.rows().len();
        page.sections[0].children[0].display = CardDisplay::Removed;
        page.relayout();
        assert_eq!(page.rows().len(), before - 2);
    }

    #[test]
    fn stats_collapse_into_one_region() {
        let json = r#"{"title":"x","sections":[{"id":"a",
            "stats":[{"label":"a","target":1},{"label":"b","target":2}],
            "skills":[{"label":"Rust","percent":90}]}]}"#;
        let page = PageModel::build(&PageSpec::from_json(json).unwrap(), 10.0);
        let regions = page.regions();
        assert_eq!(regions[0], (Region::Stats, Span::new(10.0, 20.0)));
        assert_eq!(regions[1], (Region::Skill(0), Span::new(30.0, 10.0)));
    }

    #[test]
    fn revealed_flag_is_one_way() {
        let mut page = page_with_heights(&[4]);
        assert!(page.sections[0].mark_revealed());
        assert!(!page.sections[0].mark_revealed());
        assert!(page.sections[0].revealed());
    }

    #[test]
    fn active_link_is_exclusive() {
        let mut page = page_with_heights(&[4, 4, 4]);
        page.set_active_link(Some("s1"));
        page.set_active_link(Some("s2"));
        let active: Vec<&str> = page
            .links()
            .iter()
            .filter(|l| l.is_active())
            .map(|l| l.target.as_str())
            .collect();
        assert_eq!(active, vec!["s2"]);
        page.set_active_link(None);
        assert!(page.active_link().is_none());
    }
}
