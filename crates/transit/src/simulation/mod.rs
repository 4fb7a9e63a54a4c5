//! Periodic vehicle-position simulation.
//!
//! The [`Simulator`] is the only writer of vehicle state. After every tick it
//! publishes an immutable [`FleetSnapshot`] through a [`FleetHandle`]; readers
//! take the snapshot once and never see a vehicle half-way through an update.

pub mod config;
pub mod fleet;
pub mod simulator;
pub mod vehicle;

pub use config::SimulationConfig;
pub use fleet::{FleetHandle, FleetSnapshot};
pub use simulator::Simulator;
pub use vehicle::{Vehicle, VehicleStatus};
