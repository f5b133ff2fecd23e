//! Polled controller input.
//!
//! Controllers are scanned every [`POLL_INTERVAL`] rather than consumed as
//! push events: the only question asked is "is any button down right now".
//! A missing backend or a failing scan is swallowed for that cycle and
//! polling carries on.

use anyhow::Result;
use gilrs::Gilrs;
use log::{debug, info, trace, warn};
use std::time::{Duration, Instant};

/// Scan period.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshot query over all connected controllers.
pub trait GamepadSource {
    /// `Ok(true)` if any button on any controller is currently pressed.
    fn any_button_pressed(&mut self) -> Result<bool>;
}

/// gilrs-backed source.
pub struct GilrsGamepads {
    gilrs: Gilrs,
}

impl GilrsGamepads {
    /// `None` when the platform has no usable gamepad backend.
    pub fn new() -> Option<Self> {
        match Gilrs::new() {
            Ok(gilrs) => {
                let connected = gilrs.gamepads().count();
                info!("Gamepad support initialized ({} connected)", connected);
                Some(Self { gilrs })
            }
            Err(e) => {
                warn!("Failed to initialize gamepad support: {}", e);
                None
            }
        }
    }
}

impl GamepadSource for GilrsGamepads {
    fn any_button_pressed(&mut self) -> Result<bool> {
        // Drain queued events so gilrs refreshes its cached button state
        while let Some(event) = self.gilrs.next_event() {
            trace!("Gamepad event {:?} from {}", event.event, event.id);
        }

        for (id, gamepad) in self.gilrs.gamepads() {
            // Raw codes, so buttons without a mapping count too
            let buttons = gamepad.state().buttons().map(|(code, data)| (code, data.is_pressed()));
            if let Some(code) = first_pressed(buttons) {
                debug!(
                    "Gamepad {} ({}) button {} pressed (mapped as {:?})",
                    id,
                    gamepad.name(),
                    code,
                    gamepad.axis_or_btn_name(code)
                );
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// First pressed button in a controller's `(code, pressed)` state.
fn first_pressed<C>(buttons: impl IntoIterator<Item = (C, bool)>) -> Option<C> {
    buttons.into_iter().find_map(|(code, pressed)| pressed.then_some(code))
}

/// Fixed-rate poll schedule over an optional source.
pub struct GamepadPoller {
    source: Option<Box<dyn GamepadSource>>,
    next_poll: Option<Instant>,
    active: bool,
}

impl GamepadPoller {
    pub fn new(source: Option<Box<dyn GamepadSource>>) -> Self {
        Self {
            source,
            next_poll: None,
            active: true,
        }
    }

    /// Poller with no backend. Never reports a press.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Scan if a poll is due at `now`. Returns true on a detected press.
    ///
    /// Errors from the source are dropped; the next cycle polls again.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        if let Some(next) = self.next_poll
            && now < next
        {
            return false;
        }
        self.next_poll = Some(now + POLL_INTERVAL);

        match source.any_button_pressed() {
            Ok(pressed) => pressed,
            Err(e) => {
                trace!("Gamepad poll failed: {:#}", e);
                false
            }
        }
    }

    /// Time until the next scan, `None` if polling is off.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        if !self.active || self.source.is_none() {
            return None;
        }
        Some(
            self.next_poll
                .map(|next| next.saturating_duration_since(now))
                .unwrap_or(Duration::ZERO),
        )
    }

    pub fn is_active(&self) -> bool {
        self.active && self.source.is_some()
    }

    /// Stop polling for good.
    pub fn cancel(&mut self) {
        self.active = false;
        self.next_poll = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Scripted {
        pressed: Rc<Cell<bool>>,
        calls: Rc<Cell<usize>>,
    }

    impl GamepadSource for Scripted {
        fn any_button_pressed(&mut self) -> Result<bool> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.pressed.get())
        }
    }

    struct Broken;

    impl GamepadSource for Broken {
        fn any_button_pressed(&mut self) -> Result<bool> {
            anyhow::bail!("gamepad API unavailable")
        }
    }

    #[test]
    fn test_polls_at_fixed_interval() {
        let pressed = Rc::new(Cell::new(false));
        let calls = Rc::new(Cell::new(0));
        let mut poller = GamepadPoller::new(Some(Box::new(Scripted {
            pressed: Rc::clone(&pressed),
            calls: Rc::clone(&calls),
        })));

        let t0 = Instant::now();
        assert!(!poller.poll(t0));
        assert!(!poller.poll(t0 + Duration::from_millis(16)));
        assert!(!poller.poll(t0 + Duration::from_millis(99)));
        assert_eq!(calls.get(), 1);

        pressed.set(true);
        assert!(poller.poll(t0 + Duration::from_millis(100)));
        assert_eq!(calls.get(), 2);
        assert_eq!(
            poller.until_next(t0 + Duration::from_millis(150)),
            Some(Duration::from_millis(50))
        );
    }

    #[test]
    fn test_errors_are_swallowed_and_polling_continues() {
        let mut poller = GamepadPoller::new(Some(Box::new(Broken)));
        let t0 = Instant::now();
        for i in 0..10 {
            assert!(!poller.poll(t0 + POLL_INTERVAL * i));
        }
        assert!(poller.is_active());
    }

    #[test]
    fn test_cancel_stops_polling() {
        let calls = Rc::new(Cell::new(0));
        let mut poller = GamepadPoller::new(Some(Box::new(Scripted {
            pressed: Rc::new(Cell::new(true)),
            calls: Rc::clone(&calls),
        })));
        poller.cancel();
        assert!(!poller.poll(Instant::now()));
        assert_eq!(calls.get(), 0);
        assert_eq!(poller.until_next(Instant::now()), None);
    }

    #[test]
    fn test_any_raw_code_counts_as_pressed() {
        // 0x13c is outside the standard mapping, like extra Joy-Con buttons
        let state = [(0x130_u32, false), (0x13c, true), (0x131, false)];
        assert_eq!(first_pressed(state), Some(0x13c));
        assert_eq!(first_pressed([(0x130_u32, false), (0x131, false)]), None);
        assert_eq!(first_pressed(Vec::<(u32, bool)>::new()), None);
    }

    #[test]
    fn test_disabled_poller() {
        let mut poller = GamepadPoller::disabled();
        assert!(!poller.poll(Instant::now()));
        assert!(!poller.is_active());
    }
}
