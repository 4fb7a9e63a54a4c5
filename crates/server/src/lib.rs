//! HTTP service over the live bus network.
//!
//! The network store and the fleet handle are shared read-only by every
//! request. A single tokio task owns the [`Simulator`] and ticks it.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod simulation;
pub mod state;

use std::sync::Arc;

use addis_transit::arrivals::ArrivalEstimator;
use addis_transit::network::NetworkStore;
use addis_transit::simulation::Simulator;
use anyhow::Context;
use axum::Router;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// A router wired to a running simulation task
pub struct App {
    pub router: Router,
    pub simulation: JoinHandle<()>,
}

/// Start the simulator and build the router. Must be called inside a tokio runtime.
pub fn build_app(config: &ServerConfig, store: Arc<NetworkStore>) -> App {
    let mut simulator = Simulator::from_config(config.simulation.clone());
    simulator.initialize(&store.snapshot(), Utc::now());
    let fleet = simulator.handle();
    let estimator = ArrivalEstimator::new(config.simulation.minutes_per_hop);

    let (commands, simulation) = simulation::spawn(simulator, store.clone());
    let state = AppState {
        network: store,
        fleet,
        estimator,
        planner: Arc::new(config.planner.clone()),
        plan_timeout: config.plan_timeout(),
        commands,
    };

    App {
        router: routes::create_router(state, config.cors_permissive),
        simulation,
    }
}

/// Serve until Ctrl-C
pub async fn serve(config: ServerConfig, store: Arc<NetworkStore>) -> anyhow::Result<()> {
    let app = build_app(&config, store);

    let listener = tokio::net::TcpListener::bind(config.http_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.http_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;

    app.simulation.abort();
    Ok(())
}
