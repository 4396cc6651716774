use crate::fleet::{Route, VehicleRecord, Waypoint};
use crate::geometry::{Bounds, Position};
use crate::prelude::{FleetConfig, FleetError, FleetResult};
use crate::telemetry::log::LogManager;

/// One waypoint moved back inside the operating area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub waypoint_id: i64,
    pub original: Position,
    pub corrected: Position,
}

/// One waypoint whose time window was inverted or non-finite and has been
/// collapsed to a zero-duration point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRepair {
    pub waypoint_id: i64,
    pub original: (f64, f64),
    pub repaired: f64,
}

/// Outcome of validating a whole route. `route` is always fully in-bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteValidation {
    pub route: Route,
    pub corrections: Vec<Correction>,
    pub window_repairs: Vec<WindowRepair>,
}

impl RouteValidation {
    /// True when no waypoint had to be moved.
    pub fn is_valid(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn invalid_count(&self) -> usize {
        self.corrections.len()
    }

    pub fn valid_count(&self) -> usize {
        self.route.len() - self.corrections.len()
    }
}

/// Result of checking a single coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionCheck {
    pub original: Position,
    pub corrected: Option<Position>,
}

impl PositionCheck {
    pub fn is_valid(&self) -> bool {
        self.corrected.is_none()
    }

    /// The position to use downstream: the original when valid, otherwise the repair.
    pub fn position(&self) -> Position {
        self.corrected.unwrap_or(self.original)
    }

    pub fn message(&self) -> Option<String> {
        self.corrected.map(|corrected| {
            format!(
                "position ({:.2}, {:.2}) outside bounds, corrected to ({:.2}, {:.2})",
                self.original.x, self.original.y, corrected.x, corrected.y
            )
        })
    }
}

/// Single source of truth for whether a point is legal, and the only place
/// that repairs illegal points.
#[derive(Debug, Clone)]
pub struct BoundsValidator {
    bounds: Bounds,
    strict: bool,
    logger: LogManager,
}

impl BoundsValidator {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            strict: false,
            logger: LogManager::new("validator"),
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.bounds).with_strict_mode(config.strict_mode)
    }

    /// In strict mode the `admit_*` entry points reject bad records instead
    /// of repairing them. `validate_route` always repairs.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_valid(&self, x: f64, y: f64) -> bool {
        self.bounds.contains(x, y)
    }

    pub fn clamp(&self, x: f64, y: f64) -> Position {
        self.bounds.clamp(x, y)
    }

    pub fn check_position(&self, position: &Position) -> PositionCheck {
        let corrected = if self.bounds.contains_position(position) {
            None
        } else {
            Some(self.bounds.clamp_position(position))
        };
        PositionCheck {
            original: *position,
            corrected,
        }
    }

    /// Returns a copy of `route` with every waypoint inside the bounds and
    /// every time window well formed. Each moved waypoint is logged and
    /// reported in `corrections`. Never fails, and validating the output
    /// again changes nothing.
    pub fn validate_route(&self, route: &Route) -> RouteValidation {
        let mut corrections = Vec::new();
        let mut window_repairs = Vec::new();
        let mut previous_end: Option<f64> = None;

        let waypoints = route
            .iter()
            .map(|waypoint| {
                let mut repaired = waypoint.clone();

                let check = self.check_position(&waypoint.position);
                if let Some(corrected) = check.corrected {
                    self.logger.warn(&format!(
                        "route node {} corrected: ({}, {}) -> ({}, {})",
                        waypoint.id,
                        waypoint.position.x,
                        waypoint.position.y,
                        corrected.x,
                        corrected.y
                    ));
                    corrections.push(Correction {
                        waypoint_id: waypoint.id,
                        original: waypoint.position,
                        corrected,
                    });
                    repaired.position = corrected;
                }

                if !waypoint.has_valid_window() {
                    let point = collapsed_window(waypoint, previous_end);
                    self.logger.warn(&format!(
                        "route node {} has malformed window [{}, {}], treating as point at {}",
                        waypoint.id, waypoint.window_start, waypoint.window_end, point
                    ));
                    window_repairs.push(WindowRepair {
                        waypoint_id: waypoint.id,
                        original: (waypoint.window_start, waypoint.window_end),
                        repaired: point,
                    });
                    repaired.window_start = point;
                    repaired.window_end = point;
                }

                previous_end = Some(repaired.window_end);
                repaired
            })
            .collect();

        RouteValidation {
            route: Route::new(waypoints),
            corrections,
            window_repairs,
        }
    }

    /// Like `validate_route`, but honours strict mode by rejecting the route
    /// at its first out-of-bounds waypoint.
    pub fn admit_route(&self, route: &Route) -> FleetResult<RouteValidation> {
        if self.strict {
            if let Some(waypoint) = route
                .iter()
                .find(|waypoint| !self.bounds.contains_position(&waypoint.position))
            {
                return Err(FleetError::OutOfBounds {
                    subject: format!("route node {}", waypoint.id),
                    position: waypoint.position,
                });
            }
        }
        Ok(self.validate_route(route))
    }

    /// Best-effort sanity check. Returns false only when the record cannot be
    /// tracked at all; out-of-bounds data is reported but never rejected here.
    pub fn validate_truck_record(&self, record: &VehicleRecord) -> bool {
        let Some(identifier) = record.identifier() else {
            self.logger.error("vehicle record without code or id");
            return false;
        };

        if let Some(location) = &record.current_location {
            if !self.bounds.contains_position(location) {
                self.logger.warn(&format!(
                    "{}: current location {} outside bounds",
                    identifier, location
                ));
            }
        }

        let invalid_nodes = record
            .route
            .iter()
            .filter(|waypoint| !self.bounds.contains_position(&waypoint.position))
            .count();
        if invalid_nodes > 0 {
            self.logger.warn(&format!(
                "{}: {} route nodes outside bounds",
                identifier, invalid_nodes
            ));
        }

        true
    }

    /// Gate for records entering the resolver: a missing identifier is always
    /// fatal, out-of-bounds data only in strict mode.
    pub fn admit_vehicle(&self, record: &VehicleRecord) -> FleetResult<()> {
        if !self.validate_truck_record(record) {
            return Err(FleetError::MissingIdentifier);
        }
        if !self.strict {
            return Ok(());
        }

        let identifier = record.identifier().unwrap_or_default();
        if let Some(location) = record.current_location {
            if !self.bounds.contains_position(&location) {
                return Err(FleetError::OutOfBounds {
                    subject: format!("{} current location", identifier),
                    position: location,
                });
            }
        }
        self.admit_route(&record.route).map(|_| ())
    }
}

/// Instant used for a waypoint whose window cannot be trusted.
fn collapsed_window(waypoint: &Waypoint, previous_end: Option<f64>) -> f64 {
    if waypoint.window_start.is_finite() {
        waypoint.window_start
    } else if waypoint.window_end.is_finite() {
        waypoint.window_end
    } else {
        previous_end.unwrap_or(0.0)
    }
}
