//! Persistent player settings
//!
//! Best score and the generated player identity, kept across sessions.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local persistence used by the game
pub trait SettingsStore {
    fn best_score(&self) -> u32;

    fn set_best_score(&mut self, score: u32);

    /// Unique identity for leaderboard submissions, generated on first use
    fn player_identity(&mut self) -> String;
}

/// Player settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub player_identity: Option<String>,
}

impl SettingsStore for Settings {
    fn best_score(&self) -> u32 {
        self.best_score
    }

    fn set_best_score(&mut self, score: u32) {
        self.best_score = score;
    }

    fn player_identity(&mut self) -> String {
        self.player_identity
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}

/// Settings I/O failure
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings I/O error: {e}"),
            Self::Json(e) => write!(f, "settings format error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write settings as JSON
    pub fn write(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load settings, falling back to defaults if missing or unreadable
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }
}

/// Settings that save themselves to disk on every change
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    settings: Settings,
}

impl FileSettings {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = Settings::load(&path);
        Self { path, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn save(&self) {
        match self.settings.write(&self.path) {
            Ok(()) => log::debug!("Settings saved to {}", self.path.display()),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

impl SettingsStore for FileSettings {
    fn best_score(&self) -> u32 {
        self.settings.best_score
    }

    fn set_best_score(&mut self, score: u32) {
        self.settings.best_score = score;
        self.save();
    }

    fn player_identity(&mut self) -> String {
        if let Some(identity) = &self.settings.player_identity {
            return identity.clone();
        }
        let identity = self.settings.player_identity();
        self.save();
        identity
    }
}
