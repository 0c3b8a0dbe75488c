//! Tokio driver for the workout engine.
//!
//! [`WorkoutRuntime`] is a single task that owns the engine, the cue player
//! and the display sink. Commands arrive over an mpsc channel and ticks come
//! from a one-second interval that only exists while the engine is running,
//! so commands and ticks are strictly serialized and no locking is needed.
//! Pausing drops the interval; cue requests already handed to the player
//! are not recalled.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::cues::{CueToggles, CuePlayer};
use crate::display::DisplaySink;
use crate::error::{ConfigError, CoreError, Result};
use crate::events::Event;
use crate::locale::Language;
use crate::workout::{ConfigField, Effect, WorkoutEngine};

const COMMAND_BUFFER: usize = 32;

/// Control surface of a running workout.
#[derive(Debug)]
pub enum Command {
    Start,
    Pause,
    Reset,
    ToggleFullscreen,
    Edit {
        field: ConfigField,
        raw: String,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    SetToggles(CueToggles),
    SetLanguage(Language),
    Snapshot(oneshot::Sender<Event>),
    Shutdown,
}

/// Cloneable sender side of a [`WorkoutRuntime`].
#[derive(Debug, Clone)]
pub struct WorkoutHandle {
    tx: mpsc::Sender<Command>,
}

impl WorkoutHandle {
    pub async fn start(&self) -> Result<()> {
        Ok(self.tx.send(Command::Start).await?)
    }

    pub async fn pause(&self) -> Result<()> {
        Ok(self.tx.send(Command::Pause).await?)
    }

    pub async fn reset(&self) -> Result<()> {
        Ok(self.tx.send(Command::Reset).await?)
    }

    pub async fn toggle_fullscreen(&self) -> Result<()> {
        Ok(self.tx.send(Command::ToggleFullscreen).await?)
    }

    pub async fn set_toggles(&self, toggles: CueToggles) -> Result<()> {
        Ok(self.tx.send(Command::SetToggles(toggles)).await?)
    }

    pub async fn set_language(&self, language: Language) -> Result<()> {
        Ok(self.tx.send(Command::SetLanguage(language)).await?)
    }

    /// Edit a workout field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Locked`] while the workout is running, or a
    /// runtime error if the runtime has stopped.
    pub async fn edit(&self, field: ConfigField, raw: impl Into<String>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Edit {
                field,
                raw: raw.into(),
                reply,
            })
            .await?;
        let outcome = rx.await.map_err(|_| runtime_gone())?;
        Ok(outcome?)
    }

    pub async fn snapshot(&self) -> Result<Event> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| runtime_gone())
    }

    pub async fn shutdown(&self) -> Result<()> {
        Ok(self.tx.send(Command::Shutdown).await?)
    }
}

fn runtime_gone() -> CoreError {
    CoreError::Runtime("workout runtime dropped the reply".into())
}

/// Owns the engine and its collaborators and drives them from one task.
pub struct WorkoutRuntime<P, D> {
    engine: WorkoutEngine,
    player: P,
    display: D,
    fullscreen: bool,
    tick_period: Duration,
}

impl<P, D> WorkoutRuntime<P, D>
where
    P: CuePlayer + Send + 'static,
    D: DisplaySink + Send + 'static,
{
    pub fn new(engine: WorkoutEngine, player: P, display: D) -> Self {
        Self {
            engine,
            player,
            display,
            fullscreen: false,
            tick_period: Duration::from_secs(1),
        }
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Spawn onto the current tokio runtime. The join handle yields the
    /// engine once the runtime shuts down.
    pub fn spawn(self) -> (WorkoutHandle, JoinHandle<WorkoutEngine>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(self.run(rx));
        (WorkoutHandle { tx }, task)
    }

    /// Process commands and ticks until `Shutdown` or every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> WorkoutEngine {
        if self.fullscreen {
            self.display.set_fullscreen(true);
        }
        self.engine.refresh_display();
        self.flush();

        let mut ticker: Option<Interval> = None;
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle(command) {
                        break;
                    }
                }
                () = next_tick(&mut ticker) => {
                    if let Some(event) = self.engine.tick() {
                        debug!(event = event.name(), "tick changed phase");
                    }
                }
            }
            self.flush();

            // The interval lives exactly as long as the engine runs; a fresh
            // start always waits a full period before its first tick.
            match (self.engine.is_running(), ticker.is_some()) {
                (true, false) => ticker = Some(new_ticker(self.tick_period)),
                (false, true) => ticker = None,
                _ => {}
            }
        }

        debug!("workout runtime stopped");
        self.engine
    }

    /// Returns `false` when the loop should stop.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Start => {
                self.engine.start();
            }
            Command::Pause => {
                self.engine.pause();
            }
            Command::Reset => {
                self.engine.reset();
            }
            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                self.display.set_fullscreen(self.fullscreen);
            }
            Command::Edit { field, raw, reply } => {
                let outcome = self.engine.edit(field, raw).map(|_| ());
                if reply.send(outcome).is_err() {
                    warn!(field = %field, "edit reply receiver dropped");
                }
            }
            Command::SetToggles(toggles) => self.engine.set_toggles(toggles),
            Command::SetLanguage(language) => self.engine.set_language(language),
            Command::Snapshot(reply) => {
                if reply.send(self.engine.snapshot()).is_err() {
                    warn!("snapshot reply receiver dropped");
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn flush(&mut self) {
        let language = self.engine.language();
        for effect in self.engine.drain_effects() {
            match effect {
                Effect::WakeAudio => self.player.wake(),
                Effect::Cue { cue } => {
                    if let Some(request) = cue.render(language) {
                        self.player.dispatch(&request);
                    }
                }
                Effect::Display { state } => self.display.show(&state),
            }
        }
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
