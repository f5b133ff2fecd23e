//! Application module - BootApp and its per-frame driving.
//!
//! - `run` - eframe::App implementation (update loop, teardown)

mod run;

use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::assets::Assets;
use crate::audio::{AudioCue, RodioCue};
use crate::config::Settings;
use crate::core::event_bus::{AudioFailedEvent, EventBus, PhaseChangedEvent, TriggeredEvent, downcast_event};
use crate::core::{TimelinePhase, TriggerController};
use crate::input::{GamepadPoller, GamepadSource, GilrsGamepads, TriggerSource};
use crate::widgets::Stage;

/// Main application state.
pub struct BootApp {
    pub controller: TriggerController,
    pub event_bus: EventBus,
    pub assets: Assets,
    pub stage: Stage,
    /// Initial keyboard focus handed to the surface
    focus_given: bool,
    /// Last phase seen on the bus, for the window title
    shown_phase: TimelinePhase,
}

impl BootApp {
    /// Wire controller, audio cue and gamepad backend from `settings`.
    pub fn new(settings: &Settings, assets: Assets) -> Self {
        let audio: Option<Box<dyn AudioCue>> = if settings.audio_enabled {
            Some(Box::new(RodioCue::new(&assets.audio_path(), settings.volume)))
        } else {
            info!("Audio muted");
            None
        };

        let gamepads = if settings.gamepad_enabled {
            GamepadPoller::new(GilrsGamepads::new().map(|g| Box::new(g) as Box<dyn GamepadSource>))
        } else {
            info!("Gamepad polling disabled");
            GamepadPoller::disabled()
        };

        Self::with_parts(assets, audio, gamepads)
    }

    /// Build from explicit parts.
    pub fn with_parts(assets: Assets, audio: Option<Box<dyn AudioCue>>, gamepads: GamepadPoller) -> Self {
        let event_bus = EventBus::new();
        let controller = TriggerController::new(audio, gamepads, event_bus.emitter());
        Self {
            controller,
            event_bus,
            assets,
            stage: Stage::new(),
            focus_given: false,
            shown_phase: TimelinePhase::Idle,
        }
    }

    /// Forward a trigger request to the controller.
    pub fn request_trigger(&mut self, source: TriggerSource, now: Instant) {
        if !self.controller.on_trigger(source, now) {
            debug!("Trigger request from {} had no effect", source);
        }
    }

    /// Drain controller notifications. Returns true if the phase changed.
    pub fn handle_events(&mut self) -> bool {
        let mut changed = false;
        for event in self.event_bus.poll() {
            if let Some(e) = downcast_event::<TriggeredEvent>(&event) {
                debug!("Triggered via {}", e.source);
                continue;
            }
            if let Some(e) = downcast_event::<PhaseChangedEvent>(&event) {
                debug!("Phase event {} -> {}", e.from, e.to);
                self.shown_phase = e.to;
                changed = true;
                continue;
            }
            if let Some(e) = downcast_event::<AudioFailedEvent>(&event) {
                warn!("Continuing without audio: {}", e.reason);
                continue;
            }
            debug!("Unhandled event {}", (*event).type_name());
        }
        changed
    }

    pub fn shown_phase(&self) -> TimelinePhase {
        self.shown_phase
    }

    /// Repaint delay after this frame, `None` to idle until input.
    pub fn repaint_after(&self, now: Instant) -> Option<Duration> {
        self.controller.next_wakeup(now)
    }

    /// Teardown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.controller.dispose();
        info!("Boot screen closed in phase {}", self.controller.phase());
    }
}
