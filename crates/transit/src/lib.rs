//! # addis-transit
//!
//! Transit network model and live-fleet engine for Addis Ababa city buses.
//!
//! ## Features
//!
//! - **Network snapshots**: Versioned stops and routes, swapped atomically on reload
//! - **Spatial queries**: R-tree backed proximity search with haversine distances
//! - **Fleet simulation**: Seedable bus movement, delays and passenger load
//! - **Arrival estimates**: Per-stop ETAs from the latest fleet snapshot
//! - **Trip planning**: Walk, wait and ride itineraries ranked by preference
//!
//! ## Example
//!
//! ```
//! use addis_transit::prelude::*;
//! use geo::Point;
//!
//! let definition: NetworkDefinition = serde_json::from_str(r#"{
//!     "stops": [
//!         { "id": "meskel-square", "latitude": 9.0120, "longitude": 38.7634, "zone": "kirkos" },
//!         { "id": "kazanchis", "latitude": 9.0267, "longitude": 38.7756, "zone": "kirkos" }
//!     ],
//!     "routes": [{
//!         "id": "route-01", "number": "1", "operator": "anbessa",
//!         "stops": ["meskel-square", "kazanchis"],
//!         "schedule": {
//!             "firstDeparture": "05:30:00",
//!             "lastDeparture": "23:00:00",
//!             "headwayMinutes": 10
//!         },
//!         "fare": 5.0
//!     }]
//! }"#).unwrap();
//!
//! let store = NetworkStore::from_definition(definition).unwrap();
//! let network = store.snapshot();
//!
//! let nearby = network.nearby(Point::new(38.7634, 9.0120), 0.5);
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].stop.id.as_str(), "meskel-square");
//! ```

pub mod arrivals;
pub mod crowding;
pub mod identifiers;
pub mod models;
pub mod network;
pub mod planner;
pub mod simulation;
pub mod spatial;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub mod prelude {
    pub use crate::arrivals::{ArrivalEstimator, ArrivalPrediction};
    pub use crate::crowding::CrowdingLevel;
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::network::{
        Network, NetworkDefinition, NetworkStore, RouteDefinition, StopDefinition,
    };
    pub use crate::planner::{
        Optimize, Place, PlanBudget, PlannerConfig, Preferences, Segment, TripOption, TripPlan,
        TripPlanner, TripRequest,
    };
    pub use crate::simulation::{
        FleetHandle, FleetSnapshot, SimulationConfig, Simulator, Vehicle, VehicleStatus,
    };
    pub use crate::spatial::{NearbyRoute, NearbyStop};
}

pub use prelude::*;
