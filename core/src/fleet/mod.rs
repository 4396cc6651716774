pub mod vehicle;
pub mod waypoint;

pub use vehicle::{FaultState, LoadState, VehicleRecord};
pub use waypoint::{Route, Waypoint};
