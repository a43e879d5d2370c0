//! Platform glue
//!
//! Raw pointer/touch handling and UI hit-testing stay with the host; the
//! core only sees discrete [`InputEvent`]s that are already filtered for
//! UI occlusion.

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(target_arch = "wasm32")]
pub use web::WebGame;

/// Discrete player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Tap/click not over UI
    TapToStart,
    SwipeLeft,
    SwipeRight,
    LaneKeyLeft,
    LaneKeyRight,
}

impl InputEvent {
    /// Lane direction for steering inputs (-1 left, +1 right)
    pub fn steer_direction(self) -> Option<i32> {
        match self {
            InputEvent::SwipeLeft | InputEvent::LaneKeyLeft => Some(-1),
            InputEvent::SwipeRight | InputEvent::LaneKeyRight => Some(1),
            InputEvent::TapToStart => None,
        }
    }
}

/// Install the logger for the current target
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    if env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_err()
    {
        log::warn!("logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steer_direction() {
        assert_eq!(InputEvent::SwipeLeft.steer_direction(), Some(-1));
        assert_eq!(InputEvent::LaneKeyRight.steer_direction(), Some(1));
        assert_eq!(InputEvent::TapToStart.steer_direction(), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging();
        init_logging();
        log::info!("still logging");
    }
}
