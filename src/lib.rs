//! bootseq - interactive boot-sequence screen library
//!
//! Re-exports all modules for use by the binary target.

// Core engine (timeline, controller, events)
pub mod core;

// App modules
pub mod app;
pub mod assets;
pub mod audio;
pub mod cli;
pub mod config;
pub mod input;
pub mod widgets;

pub use app::BootApp;
pub use crate::core::{LayerStack, TimelinePhase, TriggerController};
pub use input::TriggerSource;
