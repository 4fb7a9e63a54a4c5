//! Core data types and enums for the bus network.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::identifiers::*;
use crate::models::schedule::RouteSchedule;

/// Language used when a requested translation is missing.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Display names keyed by language code (`en`, `am`, ...).
pub type LocalizedNames = BTreeMap<String, String>;

// ============================================================================
// Enums
// ============================================================================

/// Operating status of a route as published by the operator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    #[default]
    Active,
    Suspended,
    Maintenance,
}

/// Amenities available at a stop
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facility {
    Shelter,
    Lighting,
    PaymentTerminal,
    WheelchairAccess,
    Seating,
    RealtimeDisplay,
    #[serde(other)]
    Other,
}

// ============================================================================
// Data Structures
// ============================================================================

/// A fixed boarding/alighting point
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub names: LocalizedNames,
    pub location: Point,
    pub zone: String,
    pub facilities: BTreeSet<Facility>,
}

impl Stop {
    pub fn name(&self, lang: &str) -> &str {
        localized(&self.names, lang).unwrap_or(self.id.as_str())
    }

    pub fn has_facility(&self, facility: Facility) -> bool {
        self.facilities.contains(&facility)
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

/// An operator-specific, ordered sequence of stops with schedule and fare
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteId,
    /// Label shown on the bus (e.g., "12", "A3")
    pub number: String,
    pub names: LocalizedNames,
    pub operator: OperatorId,
    pub stop_ids: Vec<StopId>,
    pub schedule: RouteSchedule,
    /// Flat fare in birr
    pub fare: f64,
    pub status: RouteStatus,
}

impl Route {
    pub fn name(&self, lang: &str) -> &str {
        localized(&self.names, lang).unwrap_or(&self.number)
    }

    pub fn is_active(&self) -> bool {
        self.status == RouteStatus::Active
    }

    /// Whether departures run at `time` of day
    pub fn is_operating_at(&self, time: NaiveTime) -> bool {
        self.schedule.operates_at(time)
    }

    /// First position of `stop` in the sequence
    pub fn index_of(&self, stop: &StopId) -> Option<usize> {
        self.stop_ids.iter().position(|s| s == stop)
    }

    /// Every position of `stop` in the sequence (a loop may visit it twice)
    pub fn indices_of<'a>(&'a self, stop: &'a StopId) -> impl Iterator<Item = usize> + 'a {
        self.stop_ids
            .iter()
            .enumerate()
            .filter(move |(_, s)| *s == stop)
            .map(|(i, _)| i)
    }

    pub fn len(&self) -> usize {
        self.stop_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_ids.is_empty()
    }
}

fn localized<'a>(names: &'a LocalizedNames, lang: &str) -> Option<&'a str> {
    names
        .get(lang)
        .or_else(|| names.get(DEFAULT_LANGUAGE))
        .or_else(|| names.values().next())
        .map(String::as_str)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Stop not found: {0}")]
    StopNotFound(StopId),

    #[error("Route not found: {0}")]
    RouteNotFound(RouteId),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    #[error("No stop in zone: {0}")]
    ZoneNotFound(String),

    #[error("No route run by operator: {0}")]
    OperatorNotFound(OperatorId),

    #[error("Invalid network configuration: {0}")]
    ConfigInvalid(String),
}

impl TransitError {
    /// Unknown identifier or label, as opposed to a rejected configuration
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::ConfigInvalid(_))
    }
}

pub type Result<T> = std::result::Result<T, TransitError>;
