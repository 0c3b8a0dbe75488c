mod config;
mod engine;
mod phase;

pub use config::{
    clamp_field, parse_leading_int, ConfigField, ConfigProvider, ConfigSource, FieldSource,
    WorkoutConfig,
};
pub use engine::{Effect, WorkoutEngine, WorkoutState};
pub use phase::Phase;
