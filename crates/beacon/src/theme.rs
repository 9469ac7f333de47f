//! Theme preference: the application's only persisted state.
//!
//! A single light/dark string is stored under the config directory, read
//! once at startup and written through on every change. The preference
//! travels in an explicit [`ThemeContext`] rather than a process-wide
//! global.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

impl ThemeMode {
    /// The opposite mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Whether this is the dark mode.
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::PreferenceParse {
                value: other.to_string(),
            }),
        }
    }
}

/// Storage for the theme preference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    /// A store at the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store at the default preference path.
    #[must_use]
    pub fn at_default_path() -> Self {
        Self::new(Config::theme_preference_path())
    }

    /// Path of the preference file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved preference, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<ThemeMode>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(raw.parse()?))
    }

    /// Persist the preference, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, mode: ThemeMode) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, mode.to_string())?;
        Ok(())
    }
}

/// The theme state handed down to whatever renders it.
///
/// Lifecycle: [`ThemeContext::init`] loads the saved preference or falls
/// back to the system default; [`ThemeContext::set`] and
/// [`ThemeContext::toggle`] write through to the store immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeContext {
    mode: ThemeMode,
    store: ThemeStore,
}

impl ThemeContext {
    /// Load the saved preference, falling back to the system default.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing preference file cannot be read or
    /// parsed. A missing file is not an error.
    pub fn init(store: ThemeStore, system_default: ThemeMode) -> Result<Self> {
        let mode = match store.load()? {
            Some(saved) => {
                debug!(%saved, "loaded saved theme preference");
                saved
            }
            None => {
                debug!(%system_default, "no saved theme preference, using system default");
                system_default
            }
        };
        Ok(Self { mode, store })
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Whether the dark appearance is active.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.mode.is_dark()
    }

    /// Switch to the given mode, writing through to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be persisted; the
    /// in-memory mode is left unchanged in that case.
    pub fn set(&mut self, mode: ThemeMode) -> Result<()> {
        self.store.save(mode)?;
        self.mode = mode;
        Ok(())
    }

    /// Flip between light and dark, writing through to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be persisted.
    pub fn toggle(&mut self) -> Result<ThemeMode> {
        let next = self.mode.toggled();
        self.set(next)?;
        Ok(next)
    }
}
