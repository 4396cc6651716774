use super::Route;
use crate::geometry::Position;
use serde::{Deserialize, Serialize};

/// Cargo carried by a vehicle. Carried through for display only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadState {
    pub capacity: f64,
    pub current_load: f64,
    #[serde(default)]
    pub fuel_available: f64,
}

impl LoadState {
    /// Share of capacity in use, 0 when the capacity is unknown.
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0.0 {
            self.current_load / self.capacity
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultState {
    #[default]
    Operational,
    Maintenance,
    Broken,
}

/// A vehicle as delivered by the backend. Every field may be absent; the
/// core reads only the identifier, the route and the current location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub route: Route,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_state: Option<LoadState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_state: Option<FaultState>,
}

impl VehicleRecord {
    pub fn new(code: impl Into<String>, route: Route) -> Self {
        Self {
            code: Some(code.into()),
            route,
            ..Default::default()
        }
    }

    pub fn with_current_location(mut self, position: Position) -> Self {
        self.current_location = Some(position);
        self
    }

    /// Fleet code if present, otherwise the backend id. Blank values count as missing.
    pub fn identifier(&self) -> Option<&str> {
        [self.code.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.fault_state, Some(FaultState::Broken))
    }
}
