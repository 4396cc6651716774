//! Route interpolation and spatial validation core for the fleet dashboard.
//!
//! The validator owns the operating-area bounds and repairs out-of-domain
//! data; the resolver turns a waypoint schedule and a simulation time into
//! a position that is guaranteed to lie inside those bounds.

pub mod fleet;
pub mod geometry;
pub mod prelude;
pub mod resolver;
pub mod telemetry;
pub mod validation;

pub use prelude::{FleetConfig, FleetError, FleetResult};
