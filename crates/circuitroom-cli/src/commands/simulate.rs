use circuitroom_core::{format_time, Cue, CueRequest, Effect, Event, Language, Phase, Settings};
use clap::Args;

use super::WorkoutArgs;

/// Upper bound on simulated ticks; a maximal workout needs far fewer.
const MAX_TICKS: u64 = 200_000;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub workout: WorkoutArgs,
    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,
    /// Include the final-countdown tones in the output
    #[arg(long)]
    pub countdown: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let mut engine = args.workout.engine(&settings)?;
    let language = engine.language();

    let mut tick: u64 = 0;
    let started = engine.start();
    report(&args, language, tick, started, engine.drain_effects())?;

    while engine.phase() != Phase::Done {
        tick += 1;
        if tick > MAX_TICKS {
            return Err(format!("workout did not finish within {MAX_TICKS} ticks").into());
        }
        let event = engine.tick();
        report(&args, language, tick, event, engine.drain_effects())?;
    }

    if !args.json {
        println!(
            "total: {} ({} ticks)",
            format_time(u32::try_from(tick).unwrap_or(u32::MAX)),
            tick
        );
    }
    Ok(())
}

fn report(
    args: &SimulateArgs,
    language: Language,
    tick: u64,
    event: Option<Event>,
    effects: Vec<Effect>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cues = effects.into_iter().filter_map(|effect| match effect {
        Effect::Cue { cue } => Some(cue),
        Effect::WakeAudio | Effect::Display { .. } => None,
    });

    for cue in cues {
        if matches!(cue, Cue::FinalCountdown { .. }) && !args.countdown {
            continue;
        }
        if args.json {
            let line = serde_json::json!({
                "tick": tick,
                "cue": cue,
                "request": cue.render(language),
            });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!("{}  cue    {}", stamp(tick), describe_cue(&cue, language));
        }
    }

    if let Some(event) = event {
        if args.json {
            let line = serde_json::json!({ "tick": tick, "event": event });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!("{}  event  {}", stamp(tick), describe_event(&event));
        }
    }
    Ok(())
}

fn stamp(tick: u64) -> String {
    format!("[{}]", format_time(u32::try_from(tick).unwrap_or(u32::MAX)))
}

fn describe_cue(cue: &Cue, language: Language) -> String {
    match cue.render(language) {
        Some(CueRequest::Speech(speech)) => format!("\"{}\"", speech.text),
        Some(CueRequest::Tones { pattern }) => {
            let freqs: Vec<String> = pattern
                .iter()
                .map(|t| format!("{}Hz", t.frequency_hz))
                .collect();
            let name = match cue {
                Cue::PhaseTone { phase } => format!("{phase} tone"),
                Cue::Go => "go".to_string(),
                Cue::FinalCountdown { remaining_secs } => format!("countdown {remaining_secs}"),
                Cue::Completion => "completion".to_string(),
                Cue::Announce { .. } => "announce".to_string(),
            };
            format!("{name} ({})", freqs.join(" "))
        }
        None => format!("{cue:?}"),
    }
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::WorkoutStarted {
            phase,
            round,
            station,
            remaining_secs,
            ..
        } => format!("started {phase} round {round} station {station} ({remaining_secs}s)"),
        Event::PhaseChanged {
            from,
            to,
            round,
            station,
            duration_secs,
            ..
        } => format!("{from} -> {to} round {round} station {station} ({duration_secs}s)"),
        Event::WorkoutCompleted {
            rounds, stations, ..
        } => format!("complete: {rounds} rounds x {stations} stations"),
        other => other.name().to_string(),
    }
}
