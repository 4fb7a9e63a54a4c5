use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::identifiers::VehicleId;
use crate::models::types::{Result, TransitError};
use crate::simulation::vehicle::Vehicle;

/// Immutable view of every vehicle after one tick
#[derive(Clone, Debug)]
pub struct FleetSnapshot {
    pub tick: u64,
    /// Network version the tick was computed against
    pub network_version: u64,
    pub taken_at: DateTime<Utc>,
    vehicles: Vec<Vehicle>,
    index: HashMap<VehicleId, usize>,
}

impl FleetSnapshot {
    pub fn new(
        tick: u64,
        network_version: u64,
        taken_at: DateTime<Utc>,
        mut vehicles: Vec<Vehicle>,
    ) -> Self {
        vehicles.sort_by(|a, b| a.id.cmp(&b.id));
        let index = vehicles
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id.clone(), i))
            .collect();
        Self {
            tick,
            network_version,
            taken_at,
            vehicles,
            index,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, 0, DateTime::<Utc>::UNIX_EPOCH, Vec::new())
    }

    /// All vehicles, including retired ones, ordered by identifier
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn in_service(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter().filter(|v| v.is_in_service())
    }

    pub fn vehicle(&self, id: &VehicleId) -> Result<&Vehicle> {
        self.index
            .get(id)
            .map(|&i| &self.vehicles[i])
            .ok_or_else(|| TransitError::VehicleNotFound(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl Default for FleetSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Shared read access to the latest published snapshot
#[derive(Clone, Default)]
pub struct FleetHandle {
    latest: Arc<RwLock<Arc<FleetSnapshot>>>,
}

impl FleetHandle {
    pub fn snapshot(&self) -> Arc<FleetSnapshot> {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn publish(&self, snapshot: Arc<FleetSnapshot>) {
        let mut guard = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = snapshot;
    }
}
