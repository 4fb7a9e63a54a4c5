use std::sync::Arc;
use std::time::Duration;

use addis_transit::arrivals::ArrivalEstimator;
use addis_transit::network::NetworkStore;
use addis_transit::planner::PlannerConfig;
use addis_transit::simulation::FleetHandle;
use tokio::sync::mpsc;

use crate::simulation::SimulationCommand;

/// Shared by every handler; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    pub network: Arc<NetworkStore>,
    pub fleet: FleetHandle,
    pub estimator: ArrivalEstimator,
    pub planner: Arc<PlannerConfig>,
    pub plan_timeout: Duration,
    pub commands: mpsc::Sender<SimulationCommand>,
}
