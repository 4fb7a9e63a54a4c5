//! Serde schema in which the configuration collaborator publishes the network.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identifiers::*;
use crate::models::{Facility, LocalizedNames, RouteSchedule, RouteStatus};

/// A complete network version, as loaded from JSON
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDefinition {
    pub stops: Vec<StopDefinition>,
    pub routes: Vec<RouteDefinition>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDefinition {
    pub id: StopId,
    #[serde(default)]
    pub names: LocalizedNames,
    pub latitude: f64,
    pub longitude: f64,
    pub zone: String,
    #[serde(default)]
    pub facilities: BTreeSet<Facility>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    pub id: RouteId,
    pub number: String,
    #[serde(default)]
    pub names: LocalizedNames,
    pub operator: OperatorId,
    pub stops: Vec<StopId>,
    pub schedule: RouteSchedule,
    pub fare: f64,
    #[serde(default)]
    pub status: RouteStatus,
}
