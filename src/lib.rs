//! Merge Runner - endless-runner merge game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, pooling, lane control, progression)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `highscores`: Top score tracking
//! - `persistence`: Top score storage collaborators
//! - `platform`: Input events, logger bootstrap and the browser host bindings

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use highscores::TopScore;
pub use settings::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one pass per frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Value every run starts at
    pub const STARTING_VALUE: u32 = 2;
    /// Obstacle value used when the player's value has no catalog entry
    pub const FALLBACK_VALUE: u32 = 2;

    /// Lateral distance at which a lane change counts as finished
    pub const LANE_EPSILON: f32 = 0.01;
}

/// Compact display form: 2048 -> "2K", 262144 -> "262.1K", 1000000 -> "1M"
pub fn format_value(value: u32) -> String {
    fn compact(scaled: f64, suffix: &str) -> String {
        let rounded = (scaled * 10.0).round() / 10.0;
        if rounded.fract() == 0.0 {
            format!("{}{suffix}", rounded as u64)
        } else {
            format!("{rounded:.1}{suffix}")
        }
    }

    if value >= 1_000_000 {
        compact(value as f64 / 1_000_000.0, "M")
    } else if value >= 1_000 {
        compact(value as f64 / 1_000.0, "K")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2), "2");
        assert_eq!(format_value(512), "512");
        assert_eq!(format_value(1024), "1K");
        assert_eq!(format_value(2048), "2K");
        assert_eq!(format_value(131072), "131.1K");
        assert_eq!(format_value(262144), "262.1K");
        assert_eq!(format_value(1_000_000), "1M");
        assert_eq!(format_value(2_097_152), "2.1M");
    }
}
