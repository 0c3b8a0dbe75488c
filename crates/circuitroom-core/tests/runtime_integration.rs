//! Integration tests for the tokio runtime driver.
//!
//! Uses a paused clock, so "seconds" elapse instantly and deterministically.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use circuitroom_core::{
    Command, ConfigError, ConfigField, CoreError, CuePlayer, CueToggles, DisplaySink,
    DisplayState, Event, FieldSource, Language, Phase, Speech, Tone, WorkoutConfig,
    WorkoutEngine, WorkoutRuntime,
};

#[derive(Debug, Default)]
struct Log {
    wakes: usize,
    tones: Vec<Vec<Tone>>,
    speech: Vec<String>,
    frames: Vec<DisplayState>,
    fullscreen: Vec<bool>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Log>>);

impl CuePlayer for Recorder {
    fn wake(&mut self) {
        self.0.lock().unwrap().wakes += 1;
    }

    fn play(&mut self, pattern: &[Tone]) {
        self.0.lock().unwrap().tones.push(pattern.to_vec());
    }

    fn speak(&mut self, speech: &Speech) {
        self.0.lock().unwrap().speech.push(speech.text.clone());
    }
}

impl DisplaySink for Recorder {
    fn show(&mut self, state: &DisplayState) {
        self.0.lock().unwrap().frames.push(state.clone());
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.0.lock().unwrap().fullscreen.push(on);
    }
}

fn short_workout() -> WorkoutEngine {
    WorkoutEngine::new(FieldSource::new(&WorkoutConfig {
        stations_total: 2,
        rounds_total: 1,
        train_secs: 10,
        swap_secs: 5,
        rest_secs: 0,
    }))
}

fn remaining(snapshot: &Event) -> (Phase, u32, bool) {
    match snapshot {
        Event::StateSnapshot {
            phase,
            remaining_secs,
            running,
            ..
        } => (*phase, *remaining_secs, *running),
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_second_while_running() {
    let recorder = Recorder::default();
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone()).spawn();

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    let (phase, secs, running) = remaining(&handle.snapshot().await.unwrap());
    assert_eq!(phase, Phase::Training);
    assert_eq!(secs, 7);
    assert!(running);

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let log = recorder.0.lock().unwrap();
    assert_eq!(log.wakes, 1);
    assert_eq!(log.frames.first().unwrap().phase_label, "Bereit");
}

#[tokio::test(start_paused = true)]
async fn pause_stops_the_clock() {
    let recorder = Recorder::default();
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone()).spawn();

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    handle.pause().await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let (phase, secs, running) = remaining(&handle.snapshot().await.unwrap());
    assert_eq!(phase, Phase::Training);
    assert_eq!(secs, 8);
    assert!(!running);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn runs_to_completion_and_stops_ticking() {
    let recorder = Recorder::default();
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone()).spawn();

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(40)).await;

    let (phase, secs, running) = remaining(&handle.snapshot().await.unwrap());
    assert_eq!(phase, Phase::Done);
    assert_eq!(secs, 0);
    assert!(!running);

    handle.shutdown().await.unwrap();
    let engine = task.await.unwrap();
    assert_eq!(engine.phase(), Phase::Done);

    let log = recorder.0.lock().unwrap();
    assert_eq!(log.frames.last().unwrap().formatted_time, "00:00");
    assert_eq!(log.frames.last().unwrap().phase_label, "Fertig");
    assert_eq!(log.speech.last().map(String::as_str), Some("Workout fertig."));
    // Rising go tone was played once, after the only swap into training.
    let go = log
        .tones
        .iter()
        .filter(|p| p.len() == 2 && p[0].frequency_hz == 880.0)
        .count();
    assert_eq!(go, 1);
}

#[tokio::test(start_paused = true)]
async fn edits_are_locked_while_running() {
    let recorder = Recorder::default();
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone()).spawn();

    handle.start().await.unwrap();
    let err = handle.edit(ConfigField::Train, "30").await.unwrap_err();
    assert!(matches!(err, CoreError::Config(ConfigError::Locked)));

    handle.pause().await.unwrap();
    handle.edit(ConfigField::Train, "30").await.unwrap();
    let (_, secs, _) = remaining(&handle.snapshot().await.unwrap());
    assert_eq!(secs, 30);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn silenced_cues_stop_reaching_the_player_mid_workout() {
    let recorder = Recorder::default();
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone()).spawn();

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    handle.set_toggles(CueToggles::silent()).await.unwrap();
    // The snapshot round-trip guarantees the toggles were applied.
    handle.snapshot().await.unwrap();
    let (tones_before, speech_before) = {
        let log = recorder.0.lock().unwrap();
        (log.tones.len(), log.speech.len())
    };
    assert!(tones_before >= 1, "training tone should have played");

    tokio::time::sleep(Duration::from_secs(40)).await;
    let (phase, _, running) = remaining(&handle.snapshot().await.unwrap());
    assert_eq!(phase, Phase::Done);
    assert!(!running);

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let log = recorder.0.lock().unwrap();
    let after = &log.tones[tones_before..];
    // Only the completion tone survives silencing.
    assert_eq!(after.len(), 1);
    assert!(after[0].iter().all(|t| t.frequency_hz == 740.0));
    assert_eq!(log.speech.len(), speech_before);
}

#[tokio::test(start_paused = true)]
async fn language_switch_redraws_and_changes_speech() {
    let recorder = Recorder::default();
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone()).spawn();

    handle.set_language(Language::English).await.unwrap();
    handle.snapshot().await.unwrap();
    assert_eq!(
        recorder.0.lock().unwrap().frames.last().unwrap().phase_label,
        "Ready"
    );

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(40)).await;
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let log = recorder.0.lock().unwrap();
    assert_eq!(log.frames.last().unwrap().phase_label, "Done");
    assert_eq!(
        log.speech.last().map(String::as_str),
        Some("Workout complete.")
    );
}

#[tokio::test(start_paused = true)]
async fn fullscreen_toggle_reaches_display() {
    let recorder = Recorder::default();
    let (handle, task) = WorkoutRuntime::new(short_workout(), recorder.clone(), recorder.clone())
        .with_fullscreen(true)
        .spawn();

    handle.toggle_fullscreen().await.unwrap();
    handle.toggle_fullscreen().await.unwrap();
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert_eq!(recorder.0.lock().unwrap().fullscreen, vec![true, false, true]);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_runtime() {
    let (handle, task) =
        WorkoutRuntime::new(short_workout(), circuitroom_core::NullCuePlayer, Recorder::default())
            .spawn();
    drop(handle);
    let engine = task.await.unwrap();
    assert_eq!(engine.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn dropped_reply_receivers_do_not_stop_the_runtime() {
    let (tx, rx) = tokio::sync::mpsc::channel(8);
    let task = tokio::spawn(
        WorkoutRuntime::new(short_workout(), circuitroom_core::NullCuePlayer, Recorder::default())
            .run(rx),
    );

    let (reply, gone) = tokio::sync::oneshot::channel();
    drop(gone);
    tx.send(Command::Snapshot(reply)).await.unwrap();

    let (reply, gone) = tokio::sync::oneshot::channel();
    drop(gone);
    tx.send(Command::Edit {
        field: ConfigField::Train,
        raw: "30".into(),
        reply,
    })
    .await
    .unwrap();

    let (reply, snapshot) = tokio::sync::oneshot::channel();
    tx.send(Command::Snapshot(reply)).await.unwrap();
    let (phase, secs, _) = remaining(&snapshot.await.unwrap());
    assert_eq!(phase, Phase::Idle);
    assert_eq!(secs, 30);

    tx.send(Command::Shutdown).await.unwrap();
    assert_eq!(task.await.unwrap().remaining_secs(), 30);
}
