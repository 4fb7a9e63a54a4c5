//! Network data models and types.

pub mod schedule;
pub mod types;

// Re-exports for convenience
pub use schedule::RouteSchedule;
pub use types::{
    Facility, LocalizedNames, Result, Route, RouteStatus, Stop, TransitError, DEFAULT_LANGUAGE,
};
