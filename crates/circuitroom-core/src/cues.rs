//! Audio and speech cues.
//!
//! The engine decides *which* cue fires and applies the user's toggles; this
//! module turns a [`Cue`] into concrete tone patterns and utterances and
//! defines the [`CuePlayer`] seam that actually makes noise. Players are
//! fire-and-forget: nothing here reports failure back to the engine.

use serde::{Deserialize, Serialize};

use crate::locale::Language;
use crate::workout::Phase;

/// A single sine tone, scheduled `delay_ms` after the request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub gain: f32,
    pub delay_ms: u32,
}

impl Tone {
    pub const fn new(frequency_hz: f32, duration_secs: f32, gain: f32, delay_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_secs,
            gain,
            delay_ms,
        }
    }
}

/// Text to hand to a speech synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub text: String,
    /// BCP 47 tag, e.g. `de-DE`.
    pub language: String,
}

const TRAINING_TONE: [Tone; 1] = [Tone::new(660.0, 0.10, 0.09, 0)];
const SWAP_TONE: [Tone; 1] = [Tone::new(520.0, 0.10, 0.09, 0)];
const REST_TONE: [Tone; 1] = [Tone::new(420.0, 0.12, 0.10, 0)];
/// Short rising double tone, clearly different from the phase tones.
const GO_PATTERN: [Tone; 2] = [
    Tone::new(880.0, 0.09, 0.12, 0),
    Tone::new(1320.0, 0.09, 0.12, 140),
];
const COUNTDOWN_TONE: [Tone; 1] = [Tone::new(900.0, 0.09, 0.12, 0)];
const COMPLETION_PATTERN: [Tone; 2] = [
    Tone::new(740.0, 0.12, 0.11, 0),
    Tone::new(740.0, 0.12, 0.11, 170),
];

/// Something to announce by voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Announcement {
    Phase { phase: Phase },
    RoundFinished { round: u32 },
    RoundStarted { round: u32 },
    WorkoutComplete,
}

/// Cue chosen by the engine. Toggles have already been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum Cue {
    /// Phase-specific start tone.
    PhaseTone { phase: Phase },
    /// Rising double tone when Training resumes after a Swap.
    Go,
    /// One of the last five seconds of a phase.
    FinalCountdown { remaining_secs: u32 },
    /// Repeated two-tone signal on entering Done.
    Completion,
    Announce { announcement: Announcement },
}

/// Concrete request for a [`CuePlayer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CueRequest {
    Tones { pattern: Vec<Tone> },
    Speech(Speech),
}

impl Cue {
    pub fn announce(announcement: Announcement) -> Self {
        Cue::Announce { announcement }
    }

    /// Render the cue into something playable. Returns `None` for a phase
    /// without a tone or phrase (Idle, Done).
    pub fn render(&self, language: Language) -> Option<CueRequest> {
        let tones = |pattern: &[Tone]| {
            Some(CueRequest::Tones {
                pattern: pattern.to_vec(),
            })
        };

        match *self {
            Cue::PhaseTone { phase } => match phase {
                Phase::Training => tones(&TRAINING_TONE),
                Phase::Swap => tones(&SWAP_TONE),
                Phase::Rest => tones(&REST_TONE),
                Phase::Idle | Phase::Done => None,
            },
            Cue::Go => tones(&GO_PATTERN),
            Cue::FinalCountdown { .. } => tones(&COUNTDOWN_TONE),
            Cue::Completion => tones(&COMPLETION_PATTERN),
            Cue::Announce { announcement } => {
                let text = match announcement {
                    Announcement::Phase { phase } => language.phase_phrase(phase)?.to_string(),
                    Announcement::RoundFinished { round } => language.round_finished(round),
                    Announcement::RoundStarted { round } => language.round_started(round),
                    Announcement::WorkoutComplete => language.workout_complete().to_string(),
                };
                Some(CueRequest::Speech(Speech {
                    text,
                    language: language.tag().to_string(),
                }))
            }
        }
    }
}

/// Independent user switches for each cue family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueToggles {
    /// Tone on each of the last five seconds.
    #[serde(default = "default_true")]
    pub countdown: bool,
    /// Phase-start tones.
    #[serde(default = "default_true")]
    pub phase: bool,
    /// Go tone after a Swap.
    #[serde(default = "default_true")]
    pub go: bool,
    /// Spoken announcements.
    #[serde(default = "default_true")]
    pub voice: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CueToggles {
    fn default() -> Self {
        Self {
            countdown: true,
            phase: true,
            go: true,
            voice: true,
        }
    }
}

impl CueToggles {
    pub fn silent() -> Self {
        Self {
            countdown: false,
            phase: false,
            go: false,
            voice: false,
        }
    }
}

/// Whether the "workout complete" line respects the voice toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionVoice {
    /// Spoken only when voice announcements are on.
    #[default]
    FollowToggle,
    /// Always spoken, like the completion tones.
    Always,
}

/// Audio backend. Implementations must tolerate being called before any
/// explicit initialization and must never block the caller.
pub trait CuePlayer {
    /// Resume or lazily create the audio backend. Called on Start.
    fn wake(&mut self) {}

    fn play(&mut self, pattern: &[Tone]);

    /// Speak a line. A new line may cut off one still in progress.
    fn speak(&mut self, speech: &Speech);

    fn dispatch(&mut self, request: &CueRequest) {
        match request {
            CueRequest::Tones { pattern } => self.play(pattern),
            CueRequest::Speech(speech) => self.speak(speech),
        }
    }
}

/// Player for when no audio backend is available. Every request is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCuePlayer;

impl CuePlayer for NullCuePlayer {
    fn play(&mut self, _pattern: &[Tone]) {}

    fn speak(&mut self, _speech: &Speech) {}
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn wake(&mut self) {
        (**self).wake()
    }

    fn play(&mut self, pattern: &[Tone]) {
        (**self).play(pattern)
    }

    fn speak(&mut self, speech: &Speech) {
        (**self).speak(speech)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(cue: Cue) -> Vec<Tone> {
        match cue.render(Language::German) {
            Some(CueRequest::Tones { pattern }) => pattern,
            other => panic!("expected tones, got {other:?}"),
        }
    }

    #[test]
    fn phase_tones_are_distinct() {
        let training = pattern(Cue::PhaseTone { phase: Phase::Training });
        let swap = pattern(Cue::PhaseTone { phase: Phase::Swap });
        let rest = pattern(Cue::PhaseTone { phase: Phase::Rest });
        assert_eq!(training[0].frequency_hz, 660.0);
        assert_eq!(swap[0].frequency_hz, 520.0);
        assert_eq!(rest[0].frequency_hz, 420.0);
    }

    #[test]
    fn go_cue_rises() {
        let go = pattern(Cue::Go);
        assert_eq!(go.len(), 2);
        assert!(go[1].frequency_hz > go[0].frequency_hz);
        assert_eq!(go[1].delay_ms, 140);
    }

    #[test]
    fn completion_repeats_one_tone() {
        let done = pattern(Cue::Completion);
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].frequency_hz, done[1].frequency_hz);
        assert_eq!(done[1].delay_ms, 170);
    }

    #[test]
    fn idle_phase_renders_nothing() {
        assert!(Cue::PhaseTone { phase: Phase::Idle }.render(Language::English).is_none());
        assert!(Cue::announce(Announcement::Phase { phase: Phase::Done })
            .render(Language::English)
            .is_none());
    }

    #[test]
    fn announcements_carry_language_tag() {
        let request = Cue::announce(Announcement::RoundFinished { round: 1 })
            .render(Language::English)
            .unwrap();
        assert_eq!(
            request,
            CueRequest::Speech(Speech {
                text: "Round 1 finished.".into(),
                language: "en-US".into(),
            })
        );
    }

    #[test]
    fn toggles_default_on() {
        let toggles: CueToggles = toml::from_str("voice = false").unwrap();
        assert!(toggles.countdown && toggles.phase && toggles.go);
        assert!(!toggles.voice);
    }
}
