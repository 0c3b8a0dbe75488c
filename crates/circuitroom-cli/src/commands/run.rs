use std::time::Duration;

use circuitroom_core::{
    ConfigField, CuePlayer, CueToggles, Event, Language, NullCuePlayer, Settings, WorkoutHandle,
    WorkoutRuntime,
};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::WorkoutArgs;
use crate::terminal::{TerminalCuePlayer, TerminalDisplay};

const HELP: &str = "commands: start | pause | reset | full | set <field> <value> | \
                    toggle <countdown|phase|go|voice> | lang <de|en> | quit";

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub workout: WorkoutArgs,
    /// Start immediately instead of waiting for `start`
    #[arg(long)]
    pub autostart: bool,
    /// No bell and no spoken lines
    #[arg(long)]
    pub mute: bool,
    /// Use the fullscreen layout
    #[arg(long)]
    pub fullscreen: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Reset,
    Fullscreen,
    Set { field: ConfigField, raw: String },
    Toggle(CueFamily),
    Language(Language),
    Quit,
    Help,
}

/// One independently switchable group of cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CueFamily {
    Countdown,
    Phase,
    Go,
    Voice,
}

impl CueFamily {
    fn switch(self, toggles: &mut CueToggles) -> &mut bool {
        match self {
            CueFamily::Countdown => &mut toggles.countdown,
            CueFamily::Phase => &mut toggles.phase,
            CueFamily::Go => &mut toggles.go,
            CueFamily::Voice => &mut toggles.voice,
        }
    }

    /// Flip this family and return its new state.
    fn flip(self, toggles: &mut CueToggles) -> bool {
        let on = self.switch(toggles);
        *on = !*on;
        *on
    }

    fn as_str(self) -> &'static str {
        match self {
            CueFamily::Countdown => "countdown",
            CueFamily::Phase => "phase",
            CueFamily::Go => "go",
            CueFamily::Voice => "voice",
        }
    }
}

impl std::str::FromStr for CueFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "countdown" => Ok(CueFamily::Countdown),
            "phase" => Ok(CueFamily::Phase),
            "go" => Ok(CueFamily::Go),
            "voice" => Ok(CueFamily::Voice),
            other => Err(format!(
                "unknown cue '{other}' (expected countdown, phase, go or voice)"
            )),
        }
    }
}

fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let input = match verb.to_ascii_lowercase().as_str() {
        "start" | "s" => Input::Start,
        "pause" | "p" | "stop" => Input::Pause,
        "reset" | "r" => Input::Reset,
        "full" | "fullscreen" | "f" => Input::Fullscreen,
        "quit" | "q" | "exit" => Input::Quit,
        "help" | "?" => Input::Help,
        "set" => {
            let field = words
                .next()
                .ok_or("usage: set <field> <value>")?
                .parse::<ConfigField>()
                .map_err(|e| e.to_string())?;
            // Everything after the field, as typed; the engine clamps it.
            let raw = words.collect::<Vec<_>>().join(" ");
            Input::Set { field, raw }
        }
        "toggle" | "t" => Input::Toggle(
            words
                .next()
                .ok_or("usage: toggle <countdown|phase|go|voice>")?
                .parse()?,
        ),
        "lang" | "language" => Input::Language(
            words
                .next()
                .ok_or("usage: lang <de|en>")?
                .parse::<Language>()
                .map_err(|e| e.to_string())?,
        ),
        other => return Err(format!("unknown command '{other}' ({HELP})")),
    };
    Ok(Some(input))
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let engine = args.workout.engine(&settings)?;
    let toggles = engine.toggles();

    let player: Box<dyn CuePlayer + Send> = if args.mute {
        Box::new(NullCuePlayer)
    } else {
        Box::new(TerminalCuePlayer::new())
    };
    let display = TerminalDisplay::new(std::io::stdout());
    let runtime = WorkoutRuntime::new(engine, player, display)
        .with_fullscreen(args.fullscreen || settings.display.fullscreen);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(session(runtime, toggles, args.autostart))
}

async fn session(
    runtime: WorkoutRuntime<Box<dyn CuePlayer + Send>, TerminalDisplay<std::io::Stdout>>,
    mut toggles: CueToggles,
    autostart: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, task) = runtime.spawn();
    eprintln!("{HELP}");
    if autostart {
        handle.start().await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await? {
        let input = match parse_input(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        match input {
            Input::Start => handle.start().await?,
            Input::Pause => handle.pause().await?,
            Input::Reset => handle.reset().await?,
            Input::Fullscreen => handle.toggle_fullscreen().await?,
            Input::Set { field, raw } => {
                if let Err(e) = handle.edit(field, raw).await {
                    eprintln!("\n{e}");
                }
            }
            Input::Toggle(family) => {
                let on = family.flip(&mut toggles);
                handle.set_toggles(toggles).await?;
                eprintln!("\n{} cues {}", family.as_str(), if on { "on" } else { "off" });
            }
            Input::Language(language) => handle.set_language(language).await?,
            Input::Help => eprintln!("{HELP}"),
            Input::Quit => {
                quit = true;
                break;
            }
        }
    }

    // Input closed (e.g. piped commands): let a running workout finish.
    if !quit {
        wait_until_stopped(&handle).await?;
    }

    handle.shutdown().await?;
    let engine = task.await?;
    println!();
    info!(phase = %engine.phase(), round = engine.round(), "session ended");
    Ok(())
}

async fn wait_until_stopped(handle: &WorkoutHandle) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if let Event::StateSnapshot { running: false, .. } = handle.snapshot().await? {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("start"), Ok(Some(Input::Start)));
        assert_eq!(parse_input("  P "), Ok(Some(Input::Pause)));
        assert_eq!(parse_input("full"), Ok(Some(Input::Fullscreen)));
        assert_eq!(parse_input("q"), Ok(Some(Input::Quit)));
        assert_eq!(parse_input(""), Ok(None));
    }

    #[test]
    fn parses_set_with_raw_value() {
        assert_eq!(
            parse_input("set train 45s"),
            Ok(Some(Input::Set {
                field: ConfigField::Train,
                raw: "45s".into(),
            }))
        );
        assert!(parse_input("set laps 3").is_err());
        assert!(parse_input("set").is_err());
    }

    #[test]
    fn parses_cue_toggles_and_language() {
        assert_eq!(
            parse_input("toggle voice"),
            Ok(Some(Input::Toggle(CueFamily::Voice)))
        );
        assert_eq!(parse_input("t GO"), Ok(Some(Input::Toggle(CueFamily::Go))));
        assert_eq!(
            parse_input("lang en"),
            Ok(Some(Input::Language(Language::English)))
        );
        assert!(parse_input("toggle whistle").is_err());
        assert!(parse_input("toggle").is_err());
        assert!(parse_input("lang fr").is_err());
    }

    #[test]
    fn flipping_a_family_leaves_the_others_alone() {
        let mut toggles = CueToggles::default();
        assert!(!CueFamily::Countdown.flip(&mut toggles));
        assert_eq!(
            toggles,
            CueToggles {
                countdown: false,
                ..CueToggles::default()
            }
        );
        assert!(CueFamily::Countdown.flip(&mut toggles));
        assert_eq!(toggles, CueToggles::default());
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(parse_input("jump").is_err());
    }
}
