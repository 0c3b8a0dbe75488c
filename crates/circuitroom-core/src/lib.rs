//! # Circuitroom Core Library
//!
//! This library provides the core logic for the Circuitroom circuit-training
//! timer. A workout cycles Training → Swap → Training … → Rest across a
//! configurable number of stations and rounds, firing audio and speech cues
//! at phase boundaries and reporting a live countdown to a display.
//!
//! ## Architecture
//!
//! - **Configuration Provider**: clamps user-editable fields into a valid
//!   [`WorkoutConfig`] on every read
//! - **Workout Engine**: a tick-driven state machine that requires the caller
//!   to invoke `tick()` once per second while running; side effects are
//!   queued as [`Effect`]s
//! - **Runtime**: a tokio task that owns the engine and forwards effects to a
//!   [`CuePlayer`] and a [`DisplaySink`]
//! - **Storage**: TOML-based preferences
//!
//! ## Key Components
//!
//! - [`WorkoutEngine`]: Core workout state machine
//! - [`WorkoutRuntime`]: One-second driver and command actor
//! - [`Settings`]: Preferences management

pub mod cues;
pub mod display;
pub mod error;
pub mod events;
pub mod locale;
pub mod runtime;
pub mod storage;
pub mod workout;

pub use cues::{
    Announcement, CompletionVoice, Cue, CuePlayer, CueRequest, CueToggles, NullCuePlayer, Speech,
    Tone,
};
pub use display::{format_time, DisplaySink, DisplayState};
pub use error::{ConfigError, CoreError, Result};
pub use events::Event;
pub use locale::Language;
pub use runtime::{Command, WorkoutHandle, WorkoutRuntime};
pub use storage::Settings;
pub use workout::{
    ConfigField, ConfigProvider, ConfigSource, Effect, FieldSource, Phase, WorkoutConfig,
    WorkoutEngine, WorkoutState,
};
