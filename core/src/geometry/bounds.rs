use super::Position;
use crate::prelude::{FleetError, FleetResult};
use serde::{Deserialize, Serialize};

/// Rectangular operating area. Both edges are part of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    /// The 70 x 50 city grid used by the logistics simulation.
    fn default() -> Self {
        Self {
            min_x: 0.0,
            max_x: 70.0,
            min_y: 0.0,
            max_y: 50.0,
        }
    }
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> FleetResult<Self> {
        let bounds = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> FleetResult<()> {
        let edges = [self.min_x, self.max_x, self.min_y, self.max_y];
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(FleetError::InvalidConfig(format!(
                "bounds must be finite: {:?}",
                self
            )));
        }
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(FleetError::InvalidConfig(format!(
                "bounds are inverted: x [{}, {}], y [{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn contains_position(&self, position: &Position) -> bool {
        self.contains(position.x, position.y)
    }

    /// Forces a point into the domain. NaN coordinates land on the minimum edge.
    pub fn clamp(&self, x: f64, y: f64) -> Position {
        Position {
            x: x.max(self.min_x).min(self.max_x),
            y: y.max(self.min_y).min(self.max_y),
        }
    }

    pub fn clamp_position(&self, position: &Position) -> Position {
        self.clamp(position.x, position.y)
    }

    /// True when both corners are in the domain and describe a rectangle with
    /// `top_left` above and to the left of `bottom_right`.
    pub fn contains_area(&self, top_left: &Position, bottom_right: &Position) -> bool {
        self.contains_position(top_left)
            && self.contains_position(bottom_right)
            && top_left.x <= bottom_right.x
            && top_left.y >= bottom_right.y
    }

    pub fn min_corner(&self) -> Position {
        Position::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
