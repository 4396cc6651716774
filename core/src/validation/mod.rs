pub mod fleet;
pub mod history;
pub mod validator;

pub use fleet::{
    FleetReport, FleetSummary, Severity, VehicleDiagnostics, VehicleIssues, UNIDENTIFIED,
};
pub use history::{CorrectionEntry, CorrectionHistory, CorrectionKind};
pub use validator::{BoundsValidator, Correction, PositionCheck, RouteValidation, WindowRepair};
