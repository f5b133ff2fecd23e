//! Derived layer stack for the current instant.
//!
//! Nothing here is stored state. The stack is a pure function of the phase
//! and of the fixed fade-start deadline, so repaint timing never changes
//! what is shown.

use super::timeline::{FADE_DURATION, TimelinePhase};
use std::time::{Duration, Instant};

/// Layers in paint order (bottom to top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Static,
    Animated,
    FinalFrame,
}

/// Opacities of the three layers at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStack {
    /// Start image. Always mounted, only faded.
    pub static_opacity: f32,
    /// Animation layer.
    pub animated_opacity: f32,
    /// Final frame, mounted only once `Ended`.
    pub final_frame: bool,
    /// Time since the animation layer started fading in.
    pub animation_elapsed: Duration,
}

impl LayerStack {
    /// Idle composition: only the start image is visible.
    pub const IDLE: LayerStack = LayerStack {
        static_opacity: 1.0,
        animated_opacity: 0.0,
        final_frame: false,
        animation_elapsed: Duration::ZERO,
    };

    /// Compose for `phase` at `now`. `fade_start` is the transition-start
    /// deadline, `None` while untriggered.
    pub fn compose(phase: TimelinePhase, fade_start: Option<Instant>, now: Instant) -> Self {
        let elapsed = fade_start
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();

        let progress = match phase {
            TimelinePhase::Idle => 0.0,
            TimelinePhase::Transitioning => fade_progress(elapsed),
            TimelinePhase::Playing | TimelinePhase::Ended => 1.0,
        };

        Self {
            static_opacity: 1.0 - progress,
            animated_opacity: progress,
            final_frame: phase == TimelinePhase::Ended,
            animation_elapsed: if phase == TimelinePhase::Idle { Duration::ZERO } else { elapsed },
        }
    }

    /// Layers to paint, bottom first, with their opacity. The static layer
    /// is listed even when fully transparent.
    pub fn layers(&self) -> Vec<(LayerKind, f32)> {
        let mut layers = vec![
            (LayerKind::Static, self.static_opacity),
            (LayerKind::Animated, self.animated_opacity),
        ];
        if self.final_frame {
            layers.push((LayerKind::FinalFrame, 1.0));
        }
        layers
    }

    /// True while opacities still change with time.
    pub fn is_fading(&self) -> bool {
        self.animated_opacity > 0.0 && self.animated_opacity < 1.0
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Linear fade progress in `[0, 1]`.
fn fade_progress(elapsed: Duration) -> f32 {
    (elapsed.as_secs_f32() / FADE_DURATION.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_idle_shows_static_only() {
        let stack = LayerStack::compose(TimelinePhase::Idle, None, Instant::now());
        assert_eq!(stack, LayerStack::IDLE);
        assert_eq!(stack.layers().len(), 2);
    }

    #[test]
    fn test_crossfade_runs_in_opposite_directions() {
        let start = Instant::now();
        let half = LayerStack::compose(TimelinePhase::Transitioning, Some(start), start + ms(500));
        assert!((half.static_opacity - 0.5).abs() < 1e-3);
        assert!((half.animated_opacity - 0.5).abs() < 1e-3);
        assert!(half.is_fading());

        // Sum stays 1 throughout the fade
        for t in [0, 100, 250, 900, 1000, 1500] {
            let s = LayerStack::compose(TimelinePhase::Transitioning, Some(start), start + ms(t));
            assert!((s.static_opacity + s.animated_opacity - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_playing_is_fully_animated_static_still_mounted() {
        let start = Instant::now();
        let stack = LayerStack::compose(TimelinePhase::Playing, Some(start), start + ms(1000));
        assert_eq!(stack.static_opacity, 0.0);
        assert_eq!(stack.animated_opacity, 1.0);
        assert!(!stack.final_frame);
        assert_eq!(stack.layers()[0], (LayerKind::Static, 0.0));
    }

    #[test]
    fn test_ended_puts_final_frame_on_top() {
        let start = Instant::now();
        let stack = LayerStack::compose(TimelinePhase::Ended, Some(start), start + ms(13_600));
        let layers = stack.layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers.last(), Some(&(LayerKind::FinalFrame, 1.0)));
        // Animated layer stays visible underneath
        assert_eq!(layers[1], (LayerKind::Animated, 1.0));
    }
}
