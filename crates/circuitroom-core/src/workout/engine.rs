//! Workout engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or clocks: the caller invokes `tick()` once per second while
//! `is_running()` is true.
//!
//! ## Phase Transitions
//!
//! ```text
//! Idle -> Training -> Swap -> Training -> ... -> Swap -> Rest -> Training -> ... -> Done
//! ```
//!
//! A phase ends on the tick that observes `remaining_secs == 0`; that tick
//! switches phase without decrementing, so the zero is visible for exactly
//! one tick.
//!
//! ## Side effects
//!
//! Cues and display refreshes are not performed here. They are queued as
//! [`Effect`]s and collected with [`WorkoutEngine::drain_effects`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = WorkoutEngine::new(FieldSource::default());
//! engine.start();
//! // Once per second:
//! engine.tick();
//! for effect in engine.drain_effects() { /* play / render */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{ConfigField, ConfigProvider, ConfigSource, FieldSource, WorkoutConfig};
use super::phase::Phase;
use crate::cues::{Announcement, CompletionVoice, Cue, CueToggles};
use crate::display::{format_time, is_final_countdown, DisplayState};
use crate::error::ConfigError;
use crate::events::Event;
use crate::locale::Language;

/// Mutable core of a workout. Only the engine writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutState {
    pub phase: Phase,
    /// Phase left by the most recent transition.
    pub previous_phase: Option<Phase>,
    /// 1-based.
    pub round: u32,
    /// 1-based.
    pub station: u32,
    pub remaining_secs: u32,
    pub running: bool,
    /// Set on creation and by Reset; cleared by Start. Shows the ready screen.
    pub awaiting_start: bool,
}

/// Outbound side effect produced by an engine command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Resume or initialize the audio backend.
    WakeAudio,
    Cue { cue: Cue },
    Display { state: DisplayState },
}

/// Core workout engine.
#[derive(Debug, Clone)]
pub struct WorkoutEngine<S = FieldSource> {
    provider: ConfigProvider<S>,
    /// Last snapshot read from the provider.
    config: WorkoutConfig,
    state: WorkoutState,
    toggles: CueToggles,
    completion_voice: CompletionVoice,
    language: Language,
    effects: Vec<Effect>,
}

impl<S: ConfigSource> WorkoutEngine<S> {
    /// Create an engine in `Idle`, with the Training countdown ready.
    pub fn new(source: S) -> Self {
        let mut provider = ConfigProvider::new(source);
        let config = provider.read();
        Self {
            provider,
            config,
            state: WorkoutState {
                phase: Phase::Idle,
                previous_phase: None,
                round: 1,
                station: 1,
                remaining_secs: config.train_secs,
                running: false,
                awaiting_start: true,
            },
            toggles: CueToggles::default(),
            completion_voice: CompletionVoice::default(),
            language: Language::default(),
            effects: Vec::new(),
        }
    }

    pub fn with_toggles(mut self, toggles: CueToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_completion_voice(mut self, completion_voice: CompletionVoice) -> Self {
        self.completion_voice = completion_voice;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn previous_phase(&self) -> Option<Phase> {
        self.state.previous_phase
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn station(&self) -> u32 {
        self.state.station
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn toggles(&self) -> CueToggles {
        self.toggles
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &S {
        self.provider.source()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            previous_phase: self.state.previous_phase,
            round: self.state.round,
            station: self.state.station,
            remaining_secs: self.state.remaining_secs,
            running: self.state.running,
            config: self.config,
            at: Utc::now(),
        }
    }

    /// Take all queued effects, oldest first.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Cue toggles apply from the next cue on, even while running.
    pub fn set_toggles(&mut self, toggles: CueToggles) {
        self.toggles = toggles;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.refresh_display();
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Restarts from round 1 after `Done`. No-op while running.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }

        self.effects.push(Effect::WakeAudio);
        self.state.running = true;
        self.provider.lock(true);
        let cfg = self.read_config();

        let restarted = self.state.phase == Phase::Done;
        match self.state.phase {
            Phase::Done => {
                self.state.phase = Phase::Training;
                self.state.previous_phase = None;
                self.state.round = 1;
                self.state.station = 1;
                self.state.remaining_secs = cfg.train_secs;
            }
            Phase::Idle => self.state.phase = Phase::Training,
            Phase::Training | Phase::Swap | Phase::Rest => {}
        }
        self.state.awaiting_start = false;

        self.refresh_display();
        self.phase_start_cue();

        info!(
            phase = %self.state.phase,
            round = self.state.round,
            station = self.state.station,
            remaining_secs = self.state.remaining_secs,
            restarted,
            "workout started"
        );
        Some(Event::WorkoutStarted {
            phase: self.state.phase,
            round: self.state.round,
            station: self.state.station,
            remaining_secs: self.state.remaining_secs,
            restarted,
            at: Utc::now(),
        })
    }

    /// Stop ticking and unlock configuration. Position is kept.
    pub fn pause(&mut self) -> Option<Event> {
        let was_running = self.stop();
        if !was_running {
            return None;
        }
        info!(
            phase = %self.state.phase,
            remaining_secs = self.state.remaining_secs,
            "workout paused"
        );
        Some(Event::WorkoutPaused {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Back to round 1, station 1, Training countdown, ready screen.
    pub fn reset(&mut self) -> Option<Event> {
        self.stop();
        let cfg = self.read_config();

        self.state.phase = Phase::Training;
        self.state.previous_phase = None;
        self.state.round = 1;
        self.state.station = 1;
        self.state.remaining_secs = cfg.train_secs;
        self.state.awaiting_start = true;

        self.refresh_display();
        info!(remaining_secs = cfg.train_secs, "workout reset");
        Some(Event::WorkoutReset {
            remaining_secs: cfg.train_secs,
            at: Utc::now(),
        })
    }

    /// Re-read configuration after an edit. Applies to a paused or ready
    /// workout only: the countdown restarts from the current phase's duration
    /// and station/round shrink with their totals.
    pub fn apply_config(&mut self) -> Option<Event> {
        let cfg = self.read_config();
        if self.state.running || self.state.phase == Phase::Done {
            return None;
        }

        self.state.remaining_secs = cfg.duration_for(self.state.phase);
        self.state.station = self.state.station.min(cfg.stations_total);
        self.state.round = self.state.round.min(cfg.rounds_total);

        self.refresh_display();
        debug!(
            phase = %self.state.phase,
            remaining_secs = self.state.remaining_secs,
            station = self.state.station,
            "configuration applied"
        );
        Some(Event::ConfigApplied {
            config: cfg,
            remaining_secs: self.state.remaining_secs,
            station: self.state.station,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Order: final-countdown cue, display refresh, then either a phase
    /// transition (when at zero) or a decrement. Returns `Some` when the tick
    /// changed phase. Does nothing while paused.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }

        let remaining = self.state.remaining_secs;
        if is_final_countdown(remaining) && self.toggles.countdown {
            self.cue(Cue::FinalCountdown {
                remaining_secs: remaining,
            });
        }
        self.refresh_display();

        if remaining == 0 {
            let event = self.advance();
            self.refresh_display();
            return Some(event);
        }

        self.state.remaining_secs = remaining - 1;
        None
    }

    /// Queue a display refresh for the current state.
    pub fn refresh_display(&mut self) {
        let state = self.display_state();
        self.effects.push(Effect::Display { state });
    }

    pub fn display_state(&self) -> DisplayState {
        let shown = if self.state.awaiting_start {
            Phase::Idle
        } else {
            self.state.phase
        };
        let text = self.language.phase_text(shown);
        let remaining = self.state.remaining_secs;

        DisplayState {
            formatted_time: format_time(remaining),
            phase_label: text.label.to_string(),
            status_label: text.status.to_string(),
            detail_text: text.detail.to_string(),
            round: format!("{} / {}", self.state.round, self.config.rounds_total),
            station: format!("{} / {}", self.state.station, self.config.stations_total),
            is_final_countdown: self.state.phase != Phase::Done && is_final_countdown(remaining),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read_config(&mut self) -> WorkoutConfig {
        self.config = self.provider.read();
        self.config
    }

    /// Returns whether the engine was running.
    fn stop(&mut self) -> bool {
        let was_running = self.state.running;
        self.state.running = false;
        self.provider.lock(false);
        was_running
    }

    fn enter(&mut self, phase: Phase, remaining_secs: u32) {
        self.state.phase = phase;
        self.state.remaining_secs = remaining_secs;
    }

    /// Exhaustive transition table, run on the zero tick.
    fn advance(&mut self) -> Event {
        let cfg = self.read_config();
        let from = self.state.phase;
        self.state.previous_phase = Some(from);

        match from {
            Phase::Training => {
                self.enter(Phase::Swap, cfg.swap_secs);
                self.phase_start_cue();
            }
            Phase::Swap if self.state.station < cfg.stations_total => {
                self.state.station += 1;
                self.enter(Phase::Training, cfg.train_secs);
                self.phase_start_cue();
                self.go_cue_if_needed();
            }
            Phase::Swap => {
                self.state.station = cfg.stations_total;
                self.enter(Phase::Rest, cfg.rest_secs);
                if cfg.rest_secs > 0 {
                    self.phase_start_cue();
                }
                if self.toggles.voice {
                    self.cue(Cue::announce(Announcement::RoundFinished {
                        round: self.state.round,
                    }));
                }
            }
            Phase::Rest if self.state.round < cfg.rounds_total => {
                self.state.round += 1;
                self.state.station = 1;
                self.enter(Phase::Training, cfg.train_secs);
                self.phase_start_cue();
                if self.toggles.voice {
                    self.cue(Cue::announce(Announcement::RoundStarted {
                        round: self.state.round,
                    }));
                }
            }
            Phase::Rest => return self.finish(&cfg),
            Phase::Idle | Phase::Done => {
                unreachable!("countdown running in {from} phase")
            }
        }

        debug_assert!(self.state.round <= cfg.rounds_total);
        debug_assert!(self.state.station <= cfg.stations_total);
        debug!(
            from = %from,
            to = %self.state.phase,
            round = self.state.round,
            station = self.state.station,
            remaining_secs = self.state.remaining_secs,
            "phase transition"
        );

        Event::PhaseChanged {
            from,
            to: self.state.phase,
            round: self.state.round,
            station: self.state.station,
            duration_secs: self.state.remaining_secs,
            at: Utc::now(),
        }
    }

    fn finish(&mut self, cfg: &WorkoutConfig) -> Event {
        self.stop();
        self.enter(Phase::Done, 0);

        self.cue(Cue::Completion);
        let speak = match self.completion_voice {
            CompletionVoice::Always => true,
            CompletionVoice::FollowToggle => self.toggles.voice,
        };
        if speak {
            self.cue(Cue::announce(Announcement::WorkoutComplete));
        }

        info!(
            rounds = cfg.rounds_total,
            stations = cfg.stations_total,
            "workout complete"
        );
        Event::WorkoutCompleted {
            rounds: cfg.rounds_total,
            stations: cfg.stations_total,
            at: Utc::now(),
        }
    }

    fn phase_start_cue(&mut self) {
        let phase = self.state.phase;
        if !phase.is_timed() {
            return;
        }
        if self.toggles.phase {
            self.cue(Cue::PhaseTone { phase });
        }
        if self.toggles.voice {
            self.cue(Cue::announce(Announcement::Phase { phase }));
        }
    }

    fn go_cue_if_needed(&mut self) {
        if self.toggles.go && self.state.previous_phase == Some(Phase::Swap) {
            self.cue(Cue::Go);
        }
    }

    fn cue(&mut self, cue: Cue) {
        self.effects.push(Effect::Cue { cue });
    }
}

impl WorkoutEngine<FieldSource> {
    /// Edit one field of the built-in source and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Locked`] while the workout is running.
    pub fn edit(
        &mut self,
        field: ConfigField,
        raw: impl Into<String>,
    ) -> Result<Option<Event>, ConfigError> {
        if let Err(e) = self.provider.source_mut().edit(field, raw) {
            warn!(field = %field, "edit rejected: {e}");
            return Err(e);
        }
        Ok(self.apply_config())
    }
}

impl Default for WorkoutEngine<FieldSource> {
    fn default() -> Self {
        Self::new(FieldSource::default())
    }
}
