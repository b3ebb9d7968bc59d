//! User configuration: engine settings, keybindings and the persisted theme.
//!
//! Everything is stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/folio-view/config.toml` (default
//! `~/.config/folio-view/config.toml`).  Only the `theme` line is ever
//! written back; the rest of the file is left exactly as the user wrote it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::clock::Millis;
use crate::core::form::{SubmitPolicy, SUBMIT_SETTLE};
use crate::core::observe::VisibilityMode;
use crate::core::page::DEFAULT_PX_PER_ROW;
use crate::core::theme::{PreferenceError, PreferenceStore};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions on the page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    PrevLink,
    NextLink,
    FollowLink,
    ToggleTheme,
    ToggleMenu,
    CycleFilter,
    OpenResume,
    FocusForm,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help line and tests).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::PrevLink,
        Action::NextLink,
        Action::FollowLink,
        Action::ToggleTheme,
        Action::ToggleMenu,
        Action::CycleFilter,
        Action::OpenResume,
        Action::FocusForm,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::PrevLink => "prev_link",
            Action::NextLink => "next_link",
            Action::FollowLink => "follow_link",
            Action::ToggleTheme => "toggle_theme",
            Action::ToggleMenu => "toggle_menu",
            Action::CycleFilter => "cycle_filter",
            Action::OpenResume => "open_resume",
            Action::FocusForm => "focus_form",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Short form for the status bar (e.g. `"Alt+↑"`, `"q"`).
    pub fn display(&self) -> String {
        let key = match self.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            code => key_name(code),
        };
        format!("{}{key}", self.modifier_prefix())
    }

    fn to_config_string(&self) -> String {
        format!("{}{}", self.modifier_prefix(), key_name(self.code))
    }

    fn modifier_prefix(&self) -> String {
        [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ]
        .iter()
        .filter(|(m, _)| self.modifiers.contains(*m))
        .map(|(_, p)| *p)
        .collect()
    }

    /// Parse a key string like `"Ctrl+c"`, `"Shift+Tab"`, `"q"`, `"PageDown"`.
    fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.pop()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => KeyCode::F(s[1..].parse().ok()?),
            // single characters keep their case
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: engine settings and keybindings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Document pixels per terminal row.
    pub px_per_row: f64,
    pub visibility: VisibilityMode,
    pub submit_policy: SubmitPolicy,
    /// Contact endpoint; falls back to the page description's.
    pub endpoint: Option<String>,
    /// File the settings were read from; the theme is persisted here.
    pub path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            px_per_row: DEFAULT_PX_PER_ROW,
            visibility: VisibilityMode::default(),
            submit_policy: SubmitPolicy::default(),
            endpoint: None,
            path: config_path(),
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n), KeyBind::new(Char('b'), n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char(' '), n)]);
        m.insert(PrevLink, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(NextLink, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(FollowLink, vec![KeyBind::new(Enter, n)]);
        m.insert(ToggleTheme, vec![KeyBind::new(Char('t'), n)]);
        m.insert(ToggleMenu, vec![KeyBind::new(Char('m'), n)]);
        m.insert(CycleFilter, vec![KeyBind::new(Char('f'), n)]);
        m.insert(OpenResume, vec![KeyBind::new(Char('r'), n)]);
        m.insert(FocusForm, vec![KeyBind::new(Char('c'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Char('c'), KeyModifiers::CONTROL)]);

        m
    }

    /// Find the action that matches a key event.  The binding with the
    /// most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}/{}: links | {}: go | {}: theme | {}: filter | {}: contact | {}: resume | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::PrevLink),
            self.short_binding(Action::NextLink),
            self.short_binding(Action::FollowLink),
            self.short_binding(Action::ToggleTheme),
            self.short_binding(Action::CycleFilter),
            self.short_binding(Action::FocusForm),
            self.short_binding(Action::OpenResume),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path` (or the default location), falling back to
    /// defaults for anything missing or malformed.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "no config file, using defaults");
                Self::default()
            }
        };
        config.path = path;
        config
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();
        let mut submit_delay = SUBMIT_SETTLE;
        let mut acknowledged = false;

        for (key, value) in entries(s) {
            match key {
                "px_per_row" => {
                    if let Some(v) = value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 1.0) {
                        config.px_per_row = v;
                    }
                }
                "visibility" => {
                    if let Some(mode) = VisibilityMode::parse(value) {
                        config.visibility = mode;
                    }
                }
                "submit_mode" => match value {
                    "optimistic" => acknowledged = false,
                    "acknowledged" => acknowledged = true,
                    _ => tracing::warn!(value, "unknown submit_mode"),
                },
                "submit_delay_ms" => {
                    if let Ok(v) = value.parse::<Millis>() {
                        submit_delay = v;
                    }
                }
                "endpoint" if !value.is_empty() => config.endpoint = Some(value.to_string()),
                // read through FilePreferences
                "theme" => {}
                _ => {
                    let Some(action) = Action::from_config_key(key) else {
                        continue;
                    };
                    let parsed: Vec<KeyBind> = value
                        .split(',')
                        .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                        .collect();
                    if !parsed.is_empty() {
                        config.bindings.insert(action, parsed);
                    }
                }
            }
        }

        config.submit_policy = if acknowledged {
            SubmitPolicy::Acknowledged
        } else {
            SubmitPolicy::Optimistic { settle: submit_delay }
        };
        config
    }

    /// A complete config file reproducing the current settings.
    pub fn template(&self, theme: &str) -> String {
        let (submit_mode, delay) = match self.submit_policy {
            SubmitPolicy::Optimistic { settle } => ("optimistic", settle),
            SubmitPolicy::Acknowledged => ("acknowledged", SUBMIT_SETTLE),
        };
        let mut lines = vec![
            "# folio-view configuration".to_string(),
            String::new(),
            format!("theme = {theme}"),
            format!("px_per_row = {}", self.px_per_row),
            format!("visibility = {}", self.visibility.as_str()),
            format!("submit_mode = {submit_mode}"),
            format!("submit_delay_ms = {delay}"),
            format!("endpoint = {}", self.endpoint.as_deref().unwrap_or("")),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];
        lines.extend(self.binding_lines());
        lines.push(String::new());
        lines.join("\n")
    }

    /// The key-binding lines of a config file, in `Action::ALL` order.
    fn binding_lines(&self) -> Vec<String> {
        Action::ALL
            .iter()
            .filter_map(|&action| {
                let binds = self.bindings.get(&action)?;
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                Some(format!("{} = {}", action.config_key(), keys.join(", ")))
            })
            .collect()
    }
}

/// `key = value` pairs of a config file; comments, blanks and section
/// headers are skipped, values lose surrounding quotes.
fn entries(s: &str) -> impl Iterator<Item = (&str, &str)> {
    s.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim().trim_matches('"')))
    })
}

/// Return the config file path (`$XDG_CONFIG_HOME/folio-view/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("folio-view").join("config.toml")
}

// ───────────────────────────────────────── preferences ───────

/// Preference store backed by the config file.  `set` rewrites only the
/// line for its key.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        entries(&contents)
            .filter(|(k, _)| *k == key)
            .last()
            .map(|(_, v)| v.to_string())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let existing = std::fs::read_to_string(&self.path).unwrap_or_default();
        let line = format!("{key} = {value}");
        let mut replaced = false;
        let mut lines: Vec<String> = existing
            .lines()
            .map(|l| {
                let is_key = l
                    .split_once('=')
                    .is_some_and(|(k, _)| k.trim() == key && !l.trim_start().starts_with('#'));
                if is_key && !replaced {
                    replaced = true;
                    line.clone()
                } else {
                    l.to_string()
                }
            })
            .collect();
        if !replaced {
            lines.push(line);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PreferenceError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let mut out = lines.join("\n");
        out.push('\n');
        std::fs::write(&self.path, out).map_err(|source| PreferenceError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-view-test-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("config.toml")
    }

    #[test]
    fn parses_engine_settings() {
        let cfg = AppConfig::parse_config(
            "# comment\n[view]\npx_per_row = 20\nvisibility = fixed-delay\n\
             submit_mode = optimistic\nsubmit_delay_ms = 500\nendpoint = \"https://example.com/send\"\n",
        );
        assert_eq!(cfg.px_per_row, 20.0);
        assert_eq!(cfg.visibility, VisibilityMode::FixedDelay);
        assert_eq!(cfg.submit_policy, SubmitPolicy::Optimistic { settle: 500 });
        assert_eq!(cfg.endpoint.as_deref(), Some("https://example.com/send"));
    }

    #[test]
    fn malformed_values_fall_back() {
        let cfg = AppConfig::parse_config("px_per_row = wide\nvisibility = sometimes\nnot_a_key = 1\n");
        assert_eq!(cfg.px_per_row, DEFAULT_PX_PER_ROW);
        assert_eq!(cfg.visibility, VisibilityMode::Observe);
        assert_eq!(cfg.submit_policy, SubmitPolicy::default());
    }

    #[test]
    fn acknowledged_mode() {
        let cfg = AppConfig::parse_config("submit_mode = acknowledged\n");
        assert_eq!(cfg.submit_policy, SubmitPolicy::Acknowledged);
    }

    #[test]
    fn rebinding_replaces_defaults() {
        let cfg = AppConfig::parse_config("toggle_theme = Ctrl+t, F2\n");
        let ctrl_t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL);
        let plain_t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(cfg.match_key(ctrl_t), Some(Action::ToggleTheme));
        assert_eq!(cfg.match_key(plain_t), None);
        assert!(cfg.binding_lines().contains(&"toggle_theme = Ctrl+t, F2".to_string()));
    }

    #[test]
    fn template_parses_back() {
        let mut cfg = AppConfig::parse_config("visibility = fixed-delay\nsubmit_mode = acknowledged\n");
        cfg.endpoint = Some("http://localhost:9/send".into());
        let again = AppConfig::parse_config(&cfg.template("light"));
        assert_eq!(again.visibility, VisibilityMode::FixedDelay);
        assert_eq!(again.submit_policy, SubmitPolicy::Acknowledged);
        assert_eq!(again.endpoint, cfg.endpoint);
        assert_eq!(again.bindings, cfg.bindings);
    }

    #[test]
    fn default_bindings_cover_every_action() {
        let cfg = AppConfig::default();
        for action in Action::ALL {
            assert!(cfg.bindings.get(action).is_some_and(|b| !b.is_empty()), "{action:?}");
        }
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(cfg.match_key(q), Some(Action::Quit));
    }

    #[test]
    fn file_preferences_rewrite_one_line() {
        let path = scratch("prefs");
        let mut prefs = FilePreferences::new(&path);
        assert_eq!(prefs.get("theme"), None);

        prefs.set("theme", "light").unwrap();
        std::fs::write(&path, "px_per_row = 12\n# theme = dark\ntheme = light\nquit = q\n").unwrap();
        prefs.set("theme", "dark").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "px_per_row = 12\n# theme = dark\ntheme = dark\nquit = q\n");
        assert_eq!(prefs.get("theme").as_deref(), Some("dark"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
