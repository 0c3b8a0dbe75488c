//! Terminal implementations of the display and cue seams.

use std::io::{IsTerminal, Write};

use circuitroom_core::{CuePlayer, DisplaySink, DisplayState, Speech, Tone};
use tracing::debug;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders the HUD as a single rewritten line, or as a cleared block in
/// fullscreen mode.
pub struct TerminalDisplay<W: Write> {
    out: W,
    fullscreen: bool,
    last: Option<DisplayState>,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            fullscreen: false,
            last: None,
        }
    }

    fn render(&self, state: &DisplayState) -> String {
        let marker = if state.is_final_countdown { " !" } else { "" };
        if self.fullscreen {
            format!(
                "{CLEAR_SCREEN}\n    {}{}\n\n    {}  ({})\n    Round {}   Station {}\n    {}\n",
                state.formatted_time,
                marker,
                state.phase_label,
                state.status_label,
                state.round,
                state.station,
                state.detail_text,
            )
        } else {
            format!(
                "\r{:<9} {}{:<2}  round {:<7}  station {:<7}  {:<10}",
                state.phase_label,
                state.formatted_time,
                marker,
                state.round,
                state.station,
                state.status_label,
            )
        }
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn show(&mut self, state: &DisplayState) {
        if self.last.as_ref() == Some(state) {
            return;
        }
        let frame = self.render(state);
        if let Err(e) = self.out.write_all(frame.as_bytes()).and_then(|()| self.out.flush()) {
            debug!("display write failed: {e}");
        }
        self.last = Some(state.clone());
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
        if !on {
            let _ = self.out.write_all(CLEAR_SCREEN.as_bytes());
        }
        // Force the next frame to redraw in the new layout.
        if let Some(state) = self.last.take() {
            self.show(&state);
        }
    }
}

/// Rings the terminal bell for tones and prints spoken lines.
///
/// The bell is only used when stderr is a terminal; that check happens on
/// first use.
#[derive(Default)]
pub struct TerminalCuePlayer {
    bell: Option<bool>,
}

impl TerminalCuePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn bell_enabled(&mut self) -> bool {
        *self.bell.get_or_insert_with(|| std::io::stderr().is_terminal())
    }
}

impl CuePlayer for TerminalCuePlayer {
    fn wake(&mut self) {
        self.bell_enabled();
    }

    fn play(&mut self, pattern: &[Tone]) {
        debug!(
            tones = pattern.len(),
            first_hz = pattern.first().map(|t| t.frequency_hz),
            "tone"
        );
        if self.bell_enabled() {
            let _ = std::io::stderr().write_all(b"\x07");
        }
    }

    fn speak(&mut self, speech: &Speech) {
        eprint!("\n» {} ", speech.text);
    }
}
