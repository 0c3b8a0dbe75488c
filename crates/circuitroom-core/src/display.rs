//! HUD state handed to a [`DisplaySink`].

use serde::{Deserialize, Serialize};

/// Everything a display needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// `MM:SS`
    pub formatted_time: String,
    pub phase_label: String,
    pub status_label: String,
    pub detail_text: String,
    /// `r / R`
    pub round: String,
    /// `s / S`
    pub station: String,
    /// True during the last five seconds of a phase.
    pub is_final_countdown: bool,
}

/// Receiver of display updates. Rendering is out of scope for the core.
pub trait DisplaySink {
    fn show(&mut self, state: &DisplayState);

    /// Purely cosmetic.
    fn set_fullscreen(&mut self, _on: bool) {}
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn show(&mut self, state: &DisplayState) {
        (**self).show(state)
    }

    fn set_fullscreen(&mut self, on: bool) {
        (**self).set_fullscreen(on)
    }
}

/// `MM:SS`, minutes zero-padded to at least two digits.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// True for the last five seconds of a countdown (zero excluded).
pub fn is_final_countdown(secs: u32) -> bool {
    (1..=5).contains(&secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(9), "00:09");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(600), "10:00");
        assert_eq!(format_time(6005), "100:05");
    }

    #[test]
    fn final_countdown_window() {
        assert!(!is_final_countdown(0));
        assert!(is_final_countdown(1));
        assert!(is_final_countdown(5));
        assert!(!is_final_countdown(6));
    }
}
