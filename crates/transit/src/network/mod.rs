//! Network model: stops, routes, and their atomically swapped versions.

pub mod definition;
pub mod model;
pub mod store;

pub use definition::{NetworkDefinition, RouteDefinition, StopDefinition};
pub use model::Network;
pub use store::NetworkStore;
