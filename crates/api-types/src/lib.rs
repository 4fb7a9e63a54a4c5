//! JSON shapes of the HTTP surface.
//!
//! Field names are camelCase; coordinates travel as `latitude` / `longitude`
//! pairs rather than `geo` points.

pub mod error;
pub mod fleet;
pub mod network;
pub mod trip;

pub use error::{ErrorBody, ErrorKind};
pub use fleet::{ArrivalDto, ArrivalsResponse, BusDto, LiveBusesResponse};
pub use network::{
    NearbyStopDto, ReloadResponse, ResetResponse, RouteDto, RouteStopsResponse, ScheduleDto,
    StopDto,
};
pub use trip::{
    CoordinateDto, PlaceDto, PlanStatus, PreferencesDto, SegmentDto, TripOptionDto,
    TripPlanRequest, TripPlanResponse,
};
