//! TOML-based preferences.
//!
//! Stores the values a session starts from:
//! - Default workout fields (clamped again when read by the engine)
//! - Cue toggles and the completion announcement policy
//! - Display language and fullscreen preference
//!
//! Preferences are stored at `~/.config/circuitroom/config.toml`. No workout
//! history is ever written.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::cues::{CompletionVoice, CueToggles};
use crate::error::{ConfigError, Result};
use crate::locale::Language;
use crate::workout::{FieldSource, WorkoutConfig, WorkoutEngine};

/// Cue preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSettings {
    #[serde(default = "default_true")]
    pub countdown: bool,
    #[serde(default = "default_true")]
    pub phase: bool,
    #[serde(default = "default_true")]
    pub go: bool,
    #[serde(default = "default_true")]
    pub voice: bool,
    #[serde(default)]
    pub completion_voice: CompletionVoice,
}

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub fullscreen: bool,
}

/// Application preferences.
///
/// Serialized to/from TOML at `~/.config/circuitroom/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub workout: WorkoutConfig,
    #[serde(default)]
    pub cues: CueSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_true() -> bool {
    true
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            countdown: true,
            phase: true,
            go: true,
            voice: true,
            completion_voice: CompletionVoice::default(),
        }
    }
}

impl CueSettings {
    pub fn toggles(&self) -> CueToggles {
        CueToggles {
            countdown: self.countdown,
            phase: self.phase,
            go: self.go,
            voice: self.voice,
        }
    }
}

impl Settings {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .trim()
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.to_string()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return (and write) the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed,
    /// or if the default preferences cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let settings = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(settings)
            }
            Err(_) => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a value as string by dot-separated key, e.g. `cues.voice`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by key in memory. Call [`Settings::save`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;

        // Enum-valued keys accept the same aliases as the CLI flags.
        if key == "display.language" {
            let language: Language = value.parse()?;
            json["display"]["language"] = serde_json::to_value(language).map_err(|e| {
                ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Engine primed with these preferences.
    pub fn engine(&self) -> WorkoutEngine {
        WorkoutEngine::new(FieldSource::new(&self.workout))
            .with_toggles(self.cues.toggles())
            .with_completion_voice(self.cues.completion_voice)
            .with_language(self.display.language)
    }
}
