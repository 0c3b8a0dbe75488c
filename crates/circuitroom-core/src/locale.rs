//! Display labels and spoken phrases.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::workout::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    German,
    English,
}

/// Static text for one phase as shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseText {
    pub label: &'static str,
    pub status: &'static str,
    pub detail: &'static str,
}

impl Language {
    /// BCP 47 tag handed to the speech backend.
    pub fn tag(self) -> &'static str {
        match self {
            Language::German => "de-DE",
            Language::English => "en-US",
        }
    }

    /// HUD text for a phase. `Idle` doubles as the "ready" screen.
    pub fn phase_text(self, phase: Phase) -> PhaseText {
        match (self, phase) {
            (Language::German, Phase::Training) => PhaseText {
                label: "Training",
                status: "Läuft",
                detail: "Arbeiten an allen Stationen (parallel).",
            },
            (Language::German, Phase::Swap) => PhaseText {
                label: "Wechsel",
                status: "Wechsel",
                detail: "Wechsel zur nächsten Station.",
            },
            (Language::German, Phase::Rest) => PhaseText {
                label: "Pause",
                status: "Pause",
                detail: "Pause nach Durchgang.",
            },
            (Language::German, Phase::Done) => PhaseText {
                label: "Fertig",
                status: "Fertig",
                detail: "Workout abgeschlossen.",
            },
            (Language::German, Phase::Idle) => PhaseText {
                label: "Bereit",
                status: "Bereit",
                detail: "Drücke Start.",
            },
            (Language::English, Phase::Training) => PhaseText {
                label: "Training",
                status: "Running",
                detail: "Work at all stations in parallel.",
            },
            (Language::English, Phase::Swap) => PhaseText {
                label: "Swap",
                status: "Swap",
                detail: "Move to the next station.",
            },
            (Language::English, Phase::Rest) => PhaseText {
                label: "Rest",
                status: "Rest",
                detail: "Rest after the round.",
            },
            (Language::English, Phase::Done) => PhaseText {
                label: "Done",
                status: "Done",
                detail: "Workout complete.",
            },
            (Language::English, Phase::Idle) => PhaseText {
                label: "Ready",
                status: "Ready",
                detail: "Press Start.",
            },
        }
    }

    /// Spoken name of a timed phase.
    pub fn phase_phrase(self, phase: Phase) -> Option<&'static str> {
        match (self, phase) {
            (Language::German, Phase::Training) => Some("Training."),
            (Language::German, Phase::Swap) => Some("Wechsel."),
            (Language::German, Phase::Rest) => Some("Pause."),
            (Language::English, Phase::Training) => Some("Training."),
            (Language::English, Phase::Swap) => Some("Swap."),
            (Language::English, Phase::Rest) => Some("Rest."),
            (_, Phase::Idle | Phase::Done) => None,
        }
    }

    pub fn round_finished(self, round: u32) -> String {
        match self {
            Language::German => format!("Durchgang {round} beendet."),
            Language::English => format!("Round {round} finished."),
        }
    }

    pub fn round_started(self, round: u32) -> String {
        match self {
            Language::German => format!("Durchgang {round}."),
            Language::English => format!("Round {round}."),
        }
    }

    pub fn workout_complete(self) -> &'static str {
        match self {
            Language::German => "Workout fertig.",
            Language::English => "Workout complete.",
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "de-de" | "german" | "deutsch" => Ok(Language::German),
            "en" | "en-us" | "en-gb" | "english" => Ok(Language::English),
            other => Err(ConfigError::InvalidValue {
                key: "language".into(),
                message: format!("unsupported language '{other}'"),
            }),
        }
    }
}
