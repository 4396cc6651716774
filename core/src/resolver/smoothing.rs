//! Presentation-only easing of displayed positions toward resolved targets.
//!
//! Nothing here is authoritative: business decisions read the resolver's
//! output, never a smoothed position. The displayed position is threaded
//! through the caller, so the functions are pure.

use crate::geometry::Position;
use crate::prelude::{FleetConfig, FleetError, FleetResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock step that one unit of speed is calibrated against (20 fps).
pub const REFERENCE_TICK: Duration = Duration::from_millis(50);

/// Below this distance, in grid units, the display snaps onto the target.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseInOut,
    /// Cubic ease-out.
    #[default]
    EaseOut,
}

impl Easing {
    /// Maps a blend factor in `[0, 1]` onto the eased curve. Out-of-range
    /// input is clamped first, NaN counts as 0.
    pub fn apply(self, factor: f64) -> f64 {
        let f = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        match self {
            Easing::Linear => f,
            Easing::EaseInOut => {
                if f < 0.5 {
                    2.0 * f * f
                } else {
                    1.0 - (-2.0 * f + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOut => 1.0 - (1.0 - f).powi(3),
        }
    }
}

/// Animation rate, limited to `(0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationSpeed(f64);

impl AnimationSpeed {
    pub const DEFAULT: f64 = 0.3;
    pub const MAX: f64 = 10.0;

    pub fn new(speed: f64) -> FleetResult<Self> {
        if speed.is_finite() && speed > 0.0 && speed <= Self::MAX {
            Ok(Self(speed))
        } else {
            Err(FleetError::InvalidConfig(format!(
                "animation speed must be in (0, {}], got {}",
                Self::MAX,
                speed
            )))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for AnimationSpeed {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Moves `previous` toward `target` by one wall-clock step of length `dt`.
///
/// At speed 1 a full reference tick covers the whole distance; speed 0.3
/// covers 30% of it, before easing.
pub fn smooth(
    target: Position,
    previous: Position,
    dt: Duration,
    speed: AnimationSpeed,
    easing: Easing,
) -> Position {
    let factor = (speed.get() * dt.as_secs_f64() / REFERENCE_TICK.as_secs_f64()).min(1.0);
    previous.lerp(&target, easing.apply(factor))
}

/// Bundles the smoothing parameters a renderer keeps for the whole session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    speed: AnimationSpeed,
    easing: Easing,
    snap_threshold: f64,
}

impl Smoother {
    pub fn new(speed: AnimationSpeed, easing: Easing) -> Self {
        Self {
            speed,
            easing,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }

    pub fn from_config(config: &FleetConfig) -> FleetResult<Self> {
        Ok(Self::new(AnimationSpeed::new(config.animation_speed)?, config.easing)
            .with_snap_threshold(config.snap_threshold))
    }

    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold.max(0.0);
        self
    }

    pub fn speed(&self) -> AnimationSpeed {
        self.speed
    }

    /// Next displayed position. A vehicle seen for the first time appears
    /// directly at its target.
    pub fn step(&self, target: Position, previous: Option<Position>, dt: Duration) -> Position {
        let Some(previous) = previous else {
            return target;
        };
        if previous.distance_to(&target) <= self.snap_threshold {
            return target;
        }
        smooth(target, previous, dt, self.speed, self.easing)
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(AnimationSpeed::default(), Easing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_curves_pin_their_endpoints() {
        for easing in [Easing::Linear, Easing::EaseInOut, Easing::EaseOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
            assert_eq!(easing.apply(f64::NAN), 0.0);
        }
        assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
        assert_eq!(Easing::EaseOut.apply(0.5), 0.875);
    }

    #[test]
    fn speed_is_bounded() {
        assert!(AnimationSpeed::new(0.0).is_err());
        assert!(AnimationSpeed::new(10.5).is_err());
        assert!(AnimationSpeed::new(f64::NAN).is_err());
        assert_eq!(AnimationSpeed::new(10.0).unwrap().get(), 10.0);
        assert_eq!(AnimationSpeed::default().get(), 0.3);
    }

    #[test]
    fn one_linear_tick_at_half_speed_covers_half() {
        let speed = AnimationSpeed::new(0.5).unwrap();
        let next = smooth(
            Position::new(10.0, 0.0),
            Position::new(0.0, 0.0),
            REFERENCE_TICK,
            speed,
            Easing::Linear,
        );
        assert_eq!(next, Position::new(5.0, 0.0));
    }

    #[test]
    fn long_frame_lands_on_target() {
        let speed = AnimationSpeed::new(2.0).unwrap();
        let target = Position::new(40.0, 20.0);
        let next = smooth(
            target,
            Position::new(0.0, 0.0),
            Duration::from_secs(1),
            speed,
            Easing::EaseOut,
        );
        assert_eq!(next, target);
    }

    #[test]
    fn smoother_converges_and_snaps() {
        let smoother = Smoother::default();
        let target = Position::new(20.0, 10.0);
        assert_eq!(smoother.step(target, None, REFERENCE_TICK), target);

        let mut displayed = Position::new(0.0, 0.0);
        for _ in 0..40 {
            let next = smoother.step(target, Some(displayed), REFERENCE_TICK);
            assert!(next.distance_to(&target) <= displayed.distance_to(&target));
            displayed = next;
        }
        assert_eq!(displayed, target);
    }
}
