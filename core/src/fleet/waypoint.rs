use crate::geometry::Position;
use serde::{Deserialize, Serialize};

/// A scheduled stop. The vehicle is considered parked at `position` for the
/// whole `[window_start, window_end]` interval, in simulation minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Diagnostics only; ordering comes from the route sequence.
    pub id: i64,
    #[serde(flatten)]
    pub position: Position,
    pub window_start: f64,
    pub window_end: f64,
    #[serde(default)]
    pub is_depot: bool,
    #[serde(default)]
    pub is_delivery_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Waypoint {
    pub fn new(id: i64, position: Position, window_start: f64, window_end: f64) -> Self {
        Self {
            id,
            position,
            window_start,
            window_end,
            is_depot: false,
            is_delivery_stop: false,
            payload: None,
        }
    }

    pub fn depot(mut self) -> Self {
        self.is_depot = true;
        self
    }

    pub fn delivery_stop(mut self) -> Self {
        self.is_delivery_stop = true;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Finite bounds with `window_start <= window_end`.
    pub fn has_valid_window(&self) -> bool {
        self.window_start.is_finite()
            && self.window_end.is_finite()
            && self.window_start <= self.window_end
    }

    pub fn contains_time(&self, time: f64) -> bool {
        self.window_start <= time && time <= self.window_end
    }

    /// Distance in minutes from `time` to whichever window edge is closer.
    pub fn boundary_distance(&self, time: f64) -> f64 {
        (self.window_start - time)
            .abs()
            .min((self.window_end - time).abs())
    }

    pub fn dwell(&self) -> f64 {
        self.window_end - self.window_start
    }
}

/// One vehicle's schedule, ordered by non-decreasing `window_start`.
///
/// Routes are replaced wholesale when new data arrives, never edited in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn into_waypoints(self) -> Vec<Waypoint> {
        self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Consecutive `(current, next)` pairs in schedule order.
    pub fn legs(&self) -> impl Iterator<Item = (&Waypoint, &Waypoint)> {
        self.waypoints.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Straight-line length of the path through every waypoint.
    pub fn path_length(&self) -> f64 {
        self.legs()
            .map(|(current, next)| current.position.distance_to(&next.position))
            .sum()
    }
}

impl From<Vec<Waypoint>> for Route {
    fn from(waypoints: Vec<Waypoint>) -> Self {
        Self::new(waypoints)
    }
}

impl FromIterator<Waypoint> for Route {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}
