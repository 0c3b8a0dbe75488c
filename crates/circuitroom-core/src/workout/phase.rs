use serde::{Deserialize, Serialize};

/// The five states a workout can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before the first start.
    Idle,
    Training,
    /// Athletes move to the next station.
    Swap,
    /// Break after a full rotation through all stations.
    Rest,
    /// Terminal; only Start leaves it.
    Done,
}

impl Phase {
    /// Phases that own a countdown and a phase-start tone.
    pub fn is_timed(self) -> bool {
        matches!(self, Phase::Training | Phase::Swap | Phase::Rest)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Training => "training",
            Phase::Swap => "swap",
            Phase::Rest => "rest",
            Phase::Done => "done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
