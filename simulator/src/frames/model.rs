use fleetcore::geometry::Position;
use fleetcore::resolver::{MotionState, RouteStats};
use fleetcore::telemetry::MetricsSnapshot;
use fleetcore::validation::{FleetSummary, VehicleDiagnostics};
use serde::Serialize;

/// What the renderer needs to place one vehicle marker.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleFrame {
    pub id: String,
    /// Authoritative position from the resolver.
    pub position: Position,
    /// Smoothed position for drawing only.
    pub displayed: Position,
    pub state: MotionState,
    pub progress: f64,
    pub stats: RouteStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedVehicle {
    pub id: String,
    pub reason: String,
}

/// All vehicles resolved against one simulation instant.
#[derive(Debug, Clone, Serialize)]
pub struct TickFrame {
    pub time: f64,
    pub vehicles: Vec<VehicleFrame>,
    pub rejected: Vec<RejectedVehicle>,
    pub summary: FleetSummary,
    /// Only vehicles with something to report, to keep frames small.
    pub diagnostics: Vec<VehicleDiagnostics>,
}

impl TickFrame {
    pub fn moving_count(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.state == MotionState::InTransit)
            .count()
    }
}

/// Latest state exposed to the debug overlay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameModel {
    pub latest: Option<TickFrame>,
    pub frames_published: usize,
    pub metrics: MetricsSnapshot,
    pub recent_corrections: Vec<String>,
}
