//! The task that owns the simulator.

use std::sync::Arc;

use addis_transit::identifiers::VehicleId;
use addis_transit::models::Result;
use addis_transit::network::NetworkStore;
use addis_transit::simulation::{FleetSnapshot, Simulator, VehicleStatus};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Pending commands beyond this are refused as busy
pub const COMMAND_QUEUE_DEPTH: usize = 8;

#[derive(Debug)]
pub enum SimulationCommand {
    Reset {
        reply: oneshot::Sender<Arc<FleetSnapshot>>,
    },
    SetStatus {
        vehicle: VehicleId,
        status: VehicleStatus,
        reply: oneshot::Sender<Result<Arc<FleetSnapshot>>>,
    },
}

/// Tick `simulator` on its configured interval until every command sender is dropped
pub fn spawn(
    simulator: Simulator,
    store: Arc<NetworkStore>,
) -> (mpsc::Sender<SimulationCommand>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let task = tokio::spawn(run(simulator, store, rx));
    (tx, task)
}

async fn run(
    mut simulator: Simulator,
    store: Arc<NetworkStore>,
    mut commands: mpsc::Receiver<SimulationCommand>,
) {
    let mut ticker = interval(simulator.config().tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately
    ticker.tick().await;
    info!(
        interval_secs = simulator.config().tick_interval().as_secs(),
        vehicles = simulator.vehicles().len(),
        "Simulation started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                simulator.tick(&store.snapshot());
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                handle(&mut simulator, &store, command);
            }
        }
    }
    info!(ticks = simulator.tick_count(), "Simulation stopped");
}

fn handle(simulator: &mut Simulator, store: &NetworkStore, command: SimulationCommand) {
    match command {
        SimulationCommand::Reset { reply } => {
            let fleet = simulator.reset(&store.snapshot(), Utc::now());
            let _ = reply.send(fleet);
        }
        SimulationCommand::SetStatus {
            vehicle,
            status,
            reply,
        } => {
            debug!(%vehicle, ?status, "Changing vehicle status");
            let _ = reply.send(simulator.set_vehicle_status(&vehicle, status, Utc::now()));
        }
    }
}
