//! Addis Ababa sample network shared by the unit tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::network::{Network, NetworkDefinition};

pub const ADDIS_NETWORK_JSON: &str = include_str!("../../../../data/addis-network.json");

pub fn addis_definition() -> NetworkDefinition {
    serde_json::from_str(ADDIS_NETWORK_JSON).expect("sample network parses")
}

pub fn addis_network() -> Arc<Network> {
    Arc::new(Network::build(addis_definition(), 1).expect("sample network is valid"))
}

/// A fixed instant so snapshots compare equal across runs
pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}
