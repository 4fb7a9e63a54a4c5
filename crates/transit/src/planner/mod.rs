//! Multi-leg trip composition and ranking.

pub mod composer;
pub mod request;
pub mod trip;

pub use composer::TripPlanner;
pub use request::{Optimize, Place, PlanBudget, PlannerConfig, Preferences, TripRequest};
pub use trip::{Segment, TripOption, TripPlan};
