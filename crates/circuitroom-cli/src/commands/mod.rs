pub mod config;
pub mod run;
pub mod simulate;

use clap::Args;
use circuitroom_core::{
    CompletionVoice, ConfigField, FieldSource, Language, Settings, WorkoutEngine,
};

/// Workout flags shared by `run` and `simulate`. Unset flags fall back to
/// the saved preferences. Field values are taken as typed and clamped by the
/// engine, so `--train 9000` simply becomes the maximum.
#[derive(Args, Debug, Default)]
pub struct WorkoutArgs {
    /// Number of stations (2-20)
    #[arg(long)]
    pub stations: Option<String>,
    /// Number of rounds (1-10)
    #[arg(long)]
    pub rounds: Option<String>,
    /// Training seconds per station (10-600)
    #[arg(long)]
    pub train: Option<String>,
    /// Seconds to swap stations (5-180)
    #[arg(long)]
    pub swap: Option<String>,
    /// Rest seconds after each round (0-600)
    #[arg(long)]
    pub rest: Option<String>,
    /// Label and announcement language (de, en)
    #[arg(long)]
    pub language: Option<String>,
    /// Disable the last-five-seconds tone
    #[arg(long)]
    pub no_countdown: bool,
    /// Disable phase-start tones
    #[arg(long)]
    pub no_phase: bool,
    /// Disable the go tone after a swap
    #[arg(long)]
    pub no_go: bool,
    /// Disable spoken announcements
    #[arg(long)]
    pub no_voice: bool,
    /// Always announce the end of the workout, even with --no-voice
    #[arg(long)]
    pub always_announce_completion: bool,
}

impl WorkoutArgs {
    /// Build an engine from preferences overridden by these flags.
    pub fn engine(&self, settings: &Settings) -> Result<WorkoutEngine, Box<dyn std::error::Error>> {
        let mut source = FieldSource::new(&settings.workout);
        let overrides = [
            (ConfigField::Stations, &self.stations),
            (ConfigField::Rounds, &self.rounds),
            (ConfigField::Train, &self.train),
            (ConfigField::Swap, &self.swap),
            (ConfigField::Rest, &self.rest),
        ];
        for (field, raw) in overrides {
            if let Some(raw) = raw {
                source.edit(field, raw.clone())?;
            }
        }

        let language = match &self.language {
            Some(tag) => tag.parse::<Language>()?,
            None => settings.display.language,
        };

        let mut toggles = settings.cues.toggles();
        toggles.countdown &= !self.no_countdown;
        toggles.phase &= !self.no_phase;
        toggles.go &= !self.no_go;
        toggles.voice &= !self.no_voice;

        let completion_voice = if self.always_announce_completion {
            CompletionVoice::Always
        } else {
            settings.cues.completion_voice
        };

        Ok(WorkoutEngine::new(source)
            .with_toggles(toggles)
            .with_language(language)
            .with_completion_voice(completion_voice))
    }
}
