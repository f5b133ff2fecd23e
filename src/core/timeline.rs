//! Boot timeline: phases, fixed offsets and the pending timer set.
//!
//! Every deadline is computed once from the trigger instant `t0`. Timers are
//! never chained off each other's actual fire time, so a late frame cannot
//! push later phases back.
//!
//! ```text
//! t0 ──50ms──> Transitioning ──1000ms fade──> Playing ──12600ms──> Ended
//! ```

use log::trace;
use std::fmt;
use std::time::{Duration, Instant};

/// Delay between the trigger and the start of the cross-fade.
pub const TRANSITION_DELAY: Duration = Duration::from_millis(50);

/// Cross-fade duration shared by the static and animated layers.
pub const FADE_DURATION: Duration = Duration::from_millis(1000);

/// How long the animation runs fully visible before the final frame.
pub const ANIMATION_WINDOW: Duration = Duration::from_millis(12_600);

/// Presentation phase. Strictly monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TimelinePhase {
    #[default]
    Idle,
    Transitioning,
    Playing,
    Ended,
}

impl TimelinePhase {
    /// Phase that follows this one, `None` once `Ended`.
    pub fn next(self) -> Option<Self> {
        match self {
            TimelinePhase::Idle => Some(TimelinePhase::Transitioning),
            TimelinePhase::Transitioning => Some(TimelinePhase::Playing),
            TimelinePhase::Playing => Some(TimelinePhase::Ended),
            TimelinePhase::Ended => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimelinePhase::Idle => "Idle",
            TimelinePhase::Transitioning => "Transitioning",
            TimelinePhase::Playing => "Playing",
            TimelinePhase::Ended => "Ended",
        }
    }
}

impl fmt::Display for TimelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduled callbacks owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    TransitionStart,
    TransitionEnd,
    SequenceEnd,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [
        TimerKind::TransitionStart,
        TimerKind::TransitionEnd,
        TimerKind::SequenceEnd,
    ];

    /// Fixed offset from the trigger instant.
    pub fn offset(self) -> Duration {
        match self {
            TimerKind::TransitionStart => TRANSITION_DELAY,
            TimerKind::TransitionEnd => TRANSITION_DELAY + FADE_DURATION,
            TimerKind::SequenceEnd => TRANSITION_DELAY + FADE_DURATION + ANIMATION_WINDOW,
        }
    }

    /// Phase entered when this timer fires.
    pub fn target_phase(self) -> TimelinePhase {
        match self {
            TimerKind::TransitionStart => TimelinePhase::Transitioning,
            TimerKind::TransitionEnd => TimelinePhase::Playing,
            TimerKind::SequenceEnd => TimelinePhase::Ended,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    kind: TimerKind,
    deadline: Instant,
}

/// Absolute deadlines of one timeline run, kept sorted by deadline.
#[derive(Debug, Default)]
pub struct PendingTimers {
    timers: Vec<PendingTimer>,
}

impl PendingTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule all phase timers relative to `t0`. Replaces anything pending.
    pub fn schedule_from(&mut self, t0: Instant) {
        self.timers = TimerKind::ALL
            .iter()
            .map(|&kind| PendingTimer {
                kind,
                deadline: t0 + kind.offset(),
            })
            .collect();
        self.timers.sort_by_key(|t| t.deadline);
        trace!("Scheduled {} timers from t0", self.timers.len());
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let split = self.timers.partition_point(|t| t.deadline <= now);
        self.timers.drain(..split).map(|t| t.kind).collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.first().map(|t| t.deadline)
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Cancel the whole group.
    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            trace!("Cancelled {} pending timers", self.timers.len());
        }
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_offsets_match_timeline() {
        assert_eq!(TimerKind::TransitionStart.offset(), ms(50));
        assert_eq!(TimerKind::TransitionEnd.offset(), ms(1050));
        assert_eq!(TimerKind::SequenceEnd.offset(), ms(13_650));
    }

    #[test]
    fn test_phase_order_is_strict() {
        let mut phase = TimelinePhase::Idle;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(phase, TimelinePhase::Ended);
    }

    #[test]
    fn test_take_due_in_deadline_order() {
        let t0 = Instant::now();
        let mut timers = PendingTimers::new();
        timers.schedule_from(t0);
        assert_eq!(timers.len(), 3);

        assert!(timers.take_due(t0 + ms(49)).is_empty());
        assert_eq!(timers.take_due(t0 + ms(50)), vec![TimerKind::TransitionStart]);

        // A long stall releases the remaining timers together, still in order
        let due = timers.take_due(t0 + ms(20_000));
        assert_eq!(due, vec![TimerKind::TransitionEnd, TimerKind::SequenceEnd]);
        assert!(timers.is_empty());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn test_cancel_all() {
        let t0 = Instant::now();
        let mut timers = PendingTimers::new();
        timers.schedule_from(t0);
        assert!(timers.is_pending(TimerKind::SequenceEnd));
        timers.cancel_all();
        assert!(timers.is_empty());
        assert!(timers.take_due(t0 + ms(60_000)).is_empty());
    }
}
