pub use crate::fleet::{FaultState, LoadState, Route, VehicleRecord, Waypoint};
pub use crate::geometry::{Bounds, Position};
pub use crate::resolver::{Easing, MotionState, ResolvedPosition, RouteResolver};
pub use crate::validation::BoundsValidator;

use crate::resolver::smoothing::{AnimationSpeed, DEFAULT_SNAP_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Process-wide configuration, built once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub bounds: Bounds,
    pub animation_speed: f64,
    pub strict_mode: bool,
    pub easing: Easing,
    pub snap_threshold: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            animation_speed: AnimationSpeed::DEFAULT,
            strict_mode: false,
            easing: Easing::default(),
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl FleetConfig {
    pub fn validate(&self) -> FleetResult<()> {
        self.bounds.validate()?;
        AnimationSpeed::new(self.animation_speed)?;
        if !self.snap_threshold.is_finite() || self.snap_threshold < 0.0 {
            return Err(FleetError::InvalidConfig(format!(
                "snap threshold must be a non-negative number, got {}",
                self.snap_threshold
            )));
        }
        Ok(())
    }
}

/// Common error type for the fleet core.
///
/// Out-of-bounds data is normally repaired rather than reported, so
/// `OutOfBounds` only surfaces when strict mode is enabled.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FleetError {
    #[error("vehicle record has no identifier")]
    MissingIdentifier,
    #[error("{subject} at {position} is outside the operating area")]
    OutOfBounds { subject: String, position: Position },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type FleetResult<T> = Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FleetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bounds.max_x, 70.0);
        assert!(!config.strict_mode);
    }

    #[test]
    fn config_rejects_speed_outside_range() {
        let config = FleetConfig {
            animation_speed: 12.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FleetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: FleetConfig = serde_json::from_str(r#"{"strict_mode": true}"#).unwrap();
        assert!(config.strict_mode);
        assert_eq!(config.animation_speed, 0.3);
        assert_eq!(config.bounds, Bounds::default());
    }
}
