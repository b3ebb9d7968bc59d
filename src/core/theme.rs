//! Theme preference: one persisted key mirrored onto a render attribute.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Storage key of the preference.
pub const THEME_KEY: &str = "theme";
/// Attribute the renderer reads the theme from.
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    /// Icon of the toggle button: the theme a click switches to.
    pub fn icon(self) -> &'static str {
        match self {
            ThemePreference::Light => "☾",
            ThemePreference::Dark => "☀",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to write preference file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to create preference directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
}

/// A single-namespace key/value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        (**self).set(key, value)
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct ThemeStore<S> {
    store: S,
    current: ThemePreference,
}

impl<S: PreferenceStore> ThemeStore<S> {
    /// Read the stored preference; absent or unrecognised values mean dark.
    pub fn load(store: S) -> Self {
        let current = store
            .get(THEME_KEY)
            .and_then(|v| ThemePreference::parse(&v))
            .unwrap_or_default();
        Self { store, current }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    /// `(attribute, value)` pair to mirror onto the render surface.
    pub fn attribute(&self) -> (&'static str, &'static str) {
        (THEME_ATTRIBUTE, self.current.as_str())
    }

    /// Flip and persist.  The in-memory theme changes even when the write
    /// fails; the error is returned for the caller to report.
    pub fn toggle(&mut self) -> Result<ThemePreference, PreferenceError> {
        self.current = self.current.toggled();
        tracing::info!(theme = %self.current, "theme changed");
        self.store.set(THEME_KEY, self.current.as_str())?;
        Ok(self.current)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnly;

    impl PreferenceStore for ReadOnly {
        fn get(&self, _: &str) -> Option<String> {
            Some("light".into())
        }

        fn set(&mut self, _: &str, _: &str) -> Result<(), PreferenceError> {
            Err(PreferenceError::Write {
                path: "/ro".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[test]
    fn defaults_to_dark() {
        let themes = ThemeStore::load(MemoryStore::default());
        assert_eq!(themes.current(), ThemePreference::Dark);
        assert_eq!(themes.attribute(), ("data-theme", "dark"));
    }

    #[test]
    fn garbage_value_falls_back_to_dark() {
        let mut store = MemoryStore::default();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeStore::load(store).current(), ThemePreference::Dark);
    }

    #[test]
    fn toggle_writes_every_time() {
        let mut themes = ThemeStore::load(MemoryStore::default());
        assert_eq!(themes.toggle().unwrap(), ThemePreference::Light);
        assert_eq!(themes.store().get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(themes.toggle().unwrap(), ThemePreference::Dark);
        assert_eq!(themes.store().get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn failed_write_still_flips() {
        let mut themes = ThemeStore::load(ReadOnly);
        assert_eq!(themes.current(), ThemePreference::Light);
        assert!(themes.toggle().is_err());
        assert_eq!(themes.current(), ThemePreference::Dark);
    }
}
