//! Input channels that can request a trigger.
//!
//! Handlers here only *request*; the latch lives in the controller.

pub mod gamepad;
pub mod pointer;

pub use gamepad::{GamepadPoller, GamepadSource, GilrsGamepads, POLL_INTERVAL};
pub use pointer::{close_requested, key_trigger, surface_trigger};

use std::fmt;

/// Which channel asked for the trigger. Logged, never branched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    Pointer,
    Enter,
    Space,
    Gamepad,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerSource::Pointer => "pointer",
            TriggerSource::Enter => "enter",
            TriggerSource::Space => "space",
            TriggerSource::Gamepad => "gamepad",
        };
        f.write_str(name)
    }
}
