//! Configuration provider.
//!
//! Workout parameters live in an external, user-editable [`ConfigSource`]
//! (five free-form fields). [`ConfigProvider::read`] turns whatever the user
//! typed into a valid [`WorkoutConfig`] and writes the normalized values back,
//! so the source never keeps showing invalid input. Nothing here fails:
//! garbage becomes the minimum of the field's range.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::phase::Phase;
use crate::error::ConfigError;

/// One of the five editable workout fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigField {
    Stations,
    Rounds,
    Train,
    Swap,
    Rest,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::Stations,
        ConfigField::Rounds,
        ConfigField::Train,
        ConfigField::Swap,
        ConfigField::Rest,
    ];

    /// Inclusive `(min, max)` bounds.
    pub const fn bounds(self) -> (u32, u32) {
        match self {
            ConfigField::Stations => (2, 20),
            ConfigField::Rounds => (1, 10),
            ConfigField::Train => (10, 600),
            ConfigField::Swap => (5, 180),
            ConfigField::Rest => (0, 600),
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            ConfigField::Stations => "stations",
            ConfigField::Rounds => "rounds",
            ConfigField::Train => "train",
            ConfigField::Swap => "swap",
            ConfigField::Rest => "rest",
        }
    }

    const fn index(self) -> usize {
        match self {
            ConfigField::Stations => 0,
            ConfigField::Rounds => 1,
            ConfigField::Train => 2,
            ConfigField::Swap => 3,
            ConfigField::Rest => 4,
        }
    }
}

impl FromStr for ConfigField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stations" | "stations_total" => Ok(ConfigField::Stations),
            "rounds" | "rounds_total" => Ok(ConfigField::Rounds),
            "train" | "train_secs" => Ok(ConfigField::Train),
            "swap" | "swap_secs" => Ok(ConfigField::Swap),
            "rest" | "rest_secs" => Ok(ConfigField::Rest),
            other => Err(ConfigError::UnknownField(other.to_string())),
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Validated snapshot of the workout parameters. Every field is within
/// [`ConfigField::bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutConfig {
    pub stations_total: u32,
    pub rounds_total: u32,
    pub train_secs: u32,
    pub swap_secs: u32,
    pub rest_secs: u32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            stations_total: 6,
            rounds_total: 3,
            train_secs: 60,
            swap_secs: 15,
            rest_secs: 60,
        }
    }
}

impl WorkoutConfig {
    pub fn get(&self, field: ConfigField) -> u32 {
        match field {
            ConfigField::Stations => self.stations_total,
            ConfigField::Rounds => self.rounds_total,
            ConfigField::Train => self.train_secs,
            ConfigField::Swap => self.swap_secs,
            ConfigField::Rest => self.rest_secs,
        }
    }

    /// Configured countdown for a phase. Idle counts as Training since the
    /// first start enters Training; Done has no countdown.
    pub fn duration_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Idle | Phase::Training => self.train_secs,
            Phase::Swap => self.swap_secs,
            Phase::Rest => self.rest_secs,
            Phase::Done => 0,
        }
    }

    /// Length of the whole workout in seconds, excluding the one-tick pauses
    /// at each zero crossing.
    pub fn total_secs(&self) -> u64 {
        let per_round = u64::from(self.stations_total)
            * (u64::from(self.train_secs) + u64::from(self.swap_secs))
            + u64::from(self.rest_secs);
        per_round * u64::from(self.rounds_total)
    }
}

/// Parse the leading integer of `raw`: optional whitespace, optional sign,
/// then digits. Anything after the digits is ignored. Returns `None` when
/// there are no digits. Values beyond `i64` saturate.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(b - b'0'));
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// `max(min, min(max, parse(raw) or min))`. A parsed zero also counts as
/// "no value" and falls back to `min`.
pub fn clamp_field(raw: &str, min: u32, max: u32) -> u32 {
    match parse_leading_int(raw) {
        Some(n) if n != 0 => n.clamp(i64::from(min), i64::from(max)) as u32,
        _ => min,
    }
}

/// External, user-editable storage for the five workout fields.
pub trait ConfigSource {
    /// Current raw text of a field, exactly as entered.
    fn raw(&self, field: ConfigField) -> String;

    /// Replace a field with its normalized value.
    fn write_back(&mut self, field: ConfigField, value: u32);

    /// Disable (or re-enable) user edits.
    fn set_locked(&mut self, locked: bool);

    fn is_locked(&self) -> bool;
}

/// In-memory [`ConfigSource`] holding raw field text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSource {
    values: [String; 5],
    locked: bool,
}

impl FieldSource {
    pub fn new(initial: &WorkoutConfig) -> Self {
        Self {
            values: ConfigField::ALL.map(|f| initial.get(f).to_string()),
            locked: false,
        }
    }

    /// User edit. Rejected while a workout is running.
    pub fn edit(&mut self, field: ConfigField, raw: impl Into<String>) -> Result<(), ConfigError> {
        if self.locked {
            return Err(ConfigError::Locked);
        }
        self.values[field.index()] = raw.into();
        Ok(())
    }
}

impl Default for FieldSource {
    fn default() -> Self {
        Self::new(&WorkoutConfig::default())
    }
}

impl ConfigSource for FieldSource {
    fn raw(&self, field: ConfigField) -> String {
        self.values[field.index()].clone()
    }

    fn write_back(&mut self, field: ConfigField, value: u32) {
        self.values[field.index()] = value.to_string();
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Reads and sanitizes a [`ConfigSource`].
#[derive(Debug, Clone)]
pub struct ConfigProvider<S> {
    source: S,
}

impl<S: ConfigSource> ConfigProvider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Clamp every field, write the result back, and return the snapshot.
    pub fn read(&mut self) -> WorkoutConfig {
        let mut read_field = |field: ConfigField| {
            let (min, max) = field.bounds();
            let value = clamp_field(&self.source.raw(field), min, max);
            self.source.write_back(field, value);
            value
        };

        WorkoutConfig {
            stations_total: read_field(ConfigField::Stations),
            rounds_total: read_field(ConfigField::Rounds),
            train_secs: read_field(ConfigField::Train),
            swap_secs: read_field(ConfigField::Swap),
            rest_secs: read_field(ConfigField::Rest),
        }
    }

    pub fn lock(&mut self, locked: bool) {
        self.source.set_locked(locked);
    }

    pub fn is_locked(&self) -> bool {
        self.source.is_locked()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
