//! Trigger Timeline Controller.
//!
//! Owns the latch, the phase, the pending timers, the audio cue and the
//! gamepad poller. Input handlers never touch phase or latch directly; they
//! call [`TriggerController::on_trigger`], which is the single guarded
//! activation path.
//!
//! # Driving
//!
//! The host calls [`tick`](TriggerController::tick) every frame with the
//! current instant. `tick` runs the gamepad poll when due and fires every
//! timer whose deadline has passed, earliest first. Time is always passed
//! in, so tests simulate it by offsetting a fixed `t0`.
//!
//! # Teardown
//!
//! [`dispose`](TriggerController::dispose) cancels polling and every pending
//! timer. Afterwards `tick` and `on_trigger` are inert.

use log::{debug, error, info, trace};
use std::time::{Duration, Instant};

use super::composition::LayerStack;
use super::event_bus::{AudioFailedEvent, EventEmitter, PhaseChangedEvent, TriggeredEvent};
use super::timeline::{PendingTimers, TimelinePhase, TimerKind};
use crate::audio::AudioCue;
use crate::input::{GamepadPoller, TriggerSource};

pub struct TriggerController {
    phase: TimelinePhase,
    /// One-shot activation latch.
    triggered_at: Option<Instant>,
    timers: PendingTimers,
    audio: Option<Box<dyn AudioCue>>,
    audio_attempts: usize,
    gamepads: GamepadPoller,
    emitter: EventEmitter,
    disposed: bool,
}

impl TriggerController {
    pub fn new(audio: Option<Box<dyn AudioCue>>, gamepads: GamepadPoller, emitter: EventEmitter) -> Self {
        debug!(
            "Controller created (audio: {}, gamepad polling: {})",
            audio.is_some(),
            gamepads.is_active()
        );
        Self {
            phase: TimelinePhase::Idle,
            triggered_at: None,
            timers: PendingTimers::new(),
            audio,
            audio_attempts: 0,
            gamepads,
            emitter,
            disposed: false,
        }
    }

    pub fn phase(&self) -> TimelinePhase {
        self.phase
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered_at.is_some()
    }

    pub fn triggered_at(&self) -> Option<Instant> {
        self.triggered_at
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of playback attempts made so far (0 or 1).
    pub fn audio_attempts(&self) -> usize {
        self.audio_attempts
    }

    /// Request activation. Returns true only for the call that set the latch.
    pub fn on_trigger(&mut self, source: TriggerSource, now: Instant) -> bool {
        if self.disposed {
            trace!("Trigger from {} after dispose, ignored", source);
            return false;
        }
        if self.triggered_at.is_some() {
            trace!("Trigger from {} ignored, already latched", source);
            return false;
        }

        self.triggered_at = Some(now);
        info!("Boot sequence triggered by {}", source);
        self.emitter.emit(TriggeredEvent { source });

        self.start_audio();
        self.timers.schedule_from(now);
        true
    }

    fn start_audio(&mut self) {
        let Some(audio) = self.audio.as_mut() else {
            debug!("No audio cue configured");
            return;
        };
        self.audio_attempts += 1;
        if let Err(e) = audio.play() {
            error!("Audio playback failed: {:#}", e);
            self.emitter.emit(AudioFailedEvent {
                reason: format!("{e:#}"),
            });
        }
    }

    /// Advance to `now`: poll controllers if due, then fire due timers.
    pub fn tick(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.poll_gamepads(now);

        for kind in self.timers.take_due(now) {
            self.fire(kind);
        }
    }

    /// Gamepad scan. Skipped once latched.
    pub fn poll_gamepads(&mut self, now: Instant) {
        if self.disposed || self.is_triggered() {
            return;
        }
        if self.gamepads.poll(now) {
            self.on_trigger(TriggerSource::Gamepad, now);
        }
    }

    fn fire(&mut self, kind: TimerKind) {
        let target = kind.target_phase();
        // Deadlines are sorted, so each fire is exactly one step forward
        if self.phase.next() != Some(target) {
            trace!("Timer {:?} skipped in phase {}", kind, self.phase);
            return;
        }
        let from = self.phase;
        self.phase = target;
        info!("Phase {} -> {}", from, target);
        self.emitter.emit(PhaseChangedEvent { from, to: target });
    }

    /// Layer stack to present at `now`.
    pub fn composition(&self, now: Instant) -> LayerStack {
        let fade_start = self
            .triggered_at
            .map(|t0| t0 + TimerKind::TransitionStart.offset());
        LayerStack::compose(self.phase, fade_start, now)
    }

    /// How long the host may wait before something can change.
    ///
    /// `Some(ZERO)` means repaint continuously (fade or animation running).
    /// `None` means nothing will ever change again without new input.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        if self.disposed {
            return None;
        }
        if matches!(self.phase, TimelinePhase::Transitioning | TimelinePhase::Playing) {
            return Some(Duration::ZERO);
        }
        let timer = self
            .timers
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now));
        let poll = if self.is_triggered() {
            None
        } else {
            self.gamepads.until_next(now)
        };
        match (timer, poll) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel polling and all pending timers. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.gamepads.cancel();
        self.timers.cancel_all();
        debug!("Controller disposed in phase {}", self.phase);
    }
}

impl Drop for TriggerController {
    fn drop(&mut self) {
        self.dispose();
    }
}
