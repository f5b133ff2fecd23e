//! Core engine: timeline, controller, derived composition, notifications.
//!
//! Independent of egui. Time is always passed in as an `Instant`.

pub mod composition;
pub mod controller;
pub mod event_bus;
pub mod timeline;

pub use composition::{LayerKind, LayerStack};
pub use controller::TriggerController;
pub use event_bus::EventBus;
pub use timeline::{ANIMATION_WINDOW, FADE_DURATION, TRANSITION_DELAY, TimelinePhase, TimerKind};
