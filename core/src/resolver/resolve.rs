use crate::fleet::{Route, VehicleRecord, Waypoint};
use crate::geometry::Position;
use crate::prelude::{FleetConfig, FleetResult};
use crate::telemetry::log::LogManager;
use crate::validation::BoundsValidator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    AtWaypoint,
    InTransit,
}

/// Where a vehicle is at one simulation instant.
///
/// `progress` is the completed share of the current leg while in transit and
/// 0 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub position: Position,
    pub is_moving: bool,
    pub progress: f64,
}

impl ResolvedPosition {
    pub fn stationary(position: Position) -> Self {
        Self {
            position,
            is_moving: false,
            progress: 0.0,
        }
    }

    pub fn state(&self) -> MotionState {
        if self.is_moving {
            MotionState::InTransit
        } else {
            MotionState::AtWaypoint
        }
    }
}

/// Maps a route and a simulation time to a position inside the operating area.
///
/// Holds no per-vehicle state: every call recomputes from its inputs, so the
/// same resolver can serve the whole fleet within a tick.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    validator: BoundsValidator,
    logger: LogManager,
}

impl RouteResolver {
    pub fn new(validator: BoundsValidator) -> Self {
        Self {
            validator,
            logger: LogManager::new("resolver"),
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(BoundsValidator::from_config(config))
    }

    pub fn validator(&self) -> &BoundsValidator {
        &self.validator
    }

    /// Resolves `route` at `query_time`. `current_location` is only consulted
    /// when the route is empty.
    ///
    /// Rules, first match wins:
    /// 1. empty route: the clamped current location, else the minimum corner;
    /// 2. a waypoint whose window contains the time (earliest in the route);
    /// 3. a leg whose travel gap strictly contains the time, interpolated;
    /// 4. the waypoint with the window edge nearest to the time.
    pub fn resolve(
        &self,
        route: &Route,
        query_time: f64,
        current_location: Option<Position>,
    ) -> ResolvedPosition {
        if route.is_empty() {
            return self.resolve_without_route(current_location);
        }

        let validated = self.validator.validate_route(route).route;
        if let Some(stop) = validated.iter().find(|stop| stop.contains_time(query_time)) {
            return ResolvedPosition::stationary(stop.position);
        }
        if let Some(in_transit) = self.interpolate_leg(&validated, query_time) {
            return in_transit;
        }

        let nearest = nearest_by_window(&validated, query_time);
        self.logger.detail(&format!(
            "t={} outside every window and leg, holding at node {}",
            query_time, nearest.id
        ));
        ResolvedPosition::stationary(nearest.position)
    }

    /// Resolves a backend record, refusing records that cannot be tracked
    /// (and, in strict mode, records carrying out-of-bounds data).
    pub fn resolve_vehicle(
        &self,
        record: &VehicleRecord,
        query_time: f64,
    ) -> FleetResult<ResolvedPosition> {
        self.validator.admit_vehicle(record)?;
        Ok(self.resolve(&record.route, query_time, record.current_location))
    }

    fn resolve_without_route(&self, current_location: Option<Position>) -> ResolvedPosition {
        let bounds = self.validator.bounds();
        let position = match current_location {
            Some(location) => bounds.clamp_position(&location),
            None => {
                self.logger
                    .record("empty route and no current location, using minimum corner");
                bounds.min_corner()
            }
        };
        ResolvedPosition::stationary(position)
    }

    fn interpolate_leg(&self, route: &Route, query_time: f64) -> Option<ResolvedPosition> {
        let (current, next) = route.legs().find(|(current, next)| {
            current.window_end < query_time && query_time < next.window_start
        })?;

        let gap = next.window_start - current.window_end;
        let progress = if gap > 0.0 {
            ((query_time - current.window_end) / gap).clamp(0.0, 1.0)
        } else {
            1.0
        };
        // The blend can overshoot an edge by an ulp when both ends sit on it.
        let position = self
            .validator
            .bounds()
            .clamp_position(&current.position.lerp(&next.position, progress));

        Some(ResolvedPosition {
            position,
            is_moving: true,
            progress,
        })
    }
}

/// Waypoint whose start or end is closest to `time`. Ties, and a NaN time,
/// go to the earliest waypoint. `route` must not be empty.
fn nearest_by_window(route: &Route, time: f64) -> &Waypoint {
    let waypoints = route.waypoints();

    // Far outside the schedule the distances saturate and would all tie.
    if waypoints.iter().all(|waypoint| waypoint.window_end < time) {
        if let Some(latest) = waypoints
            .iter()
            .rev()
            .max_by(|a, b| a.window_end.total_cmp(&b.window_end))
        {
            return latest;
        }
    }
    if waypoints.iter().all(|waypoint| time < waypoint.window_start) {
        if let Some(earliest) = waypoints
            .iter()
            .min_by(|a, b| a.window_start.total_cmp(&b.window_start))
        {
            return earliest;
        }
    }

    let mut nearest = &waypoints[0];
    let mut smallest = nearest.boundary_distance(time);
    for waypoint in &waypoints[1..] {
        let distance = waypoint.boundary_distance(time);
        if distance < smallest {
            smallest = distance;
            nearest = waypoint;
        }
    }
    nearest
}
