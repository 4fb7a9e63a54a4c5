use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use addis_transit::network::NetworkDefinition;
use addis_transit::planner::PlannerConfig;
use addis_transit::simulation::SimulationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_http_address")]
    pub http_address: SocketAddr,

    /// Network definition loaded at startup
    #[serde(default = "default_network_file")]
    pub network_file: PathBuf,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    /// Enumeration budget of one trip-plan request
    #[serde(default = "default_plan_timeout_ms")]
    pub plan_timeout_ms: u64,

    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

impl ServerConfig {
    pub fn plan_timeout(&self) -> Duration {
        Duration::from_millis(self.plan_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_address: default_http_address(),
            network_file: default_network_file(),
            simulation: SimulationConfig::default(),
            planner: PlannerConfig::default(),
            plan_timeout_ms: default_plan_timeout_ms(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

pub fn default_http_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

pub fn default_network_file() -> PathBuf {
    PathBuf::from("data/addis-network.json")
}

pub fn default_plan_timeout_ms() -> u64 {
    500
}

pub fn default_cors_permissive() -> bool {
    true
}

pub fn read_config(config_file: &Path) -> Result<ServerConfig> {
    info!("Reading config from file {:?}", config_file);
    let file = File::open(config_file)
        .with_context(|| format!("Error opening config file {:?}", config_file))?;
    let config: ServerConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Error parsing config file {:?}", config_file))?;
    debug!("Launching with config : {:#?}", config);
    Ok(config)
}

pub fn read_network(network_file: &Path) -> Result<NetworkDefinition> {
    info!("Reading network from file {:?}", network_file);
    let file = File::open(network_file)
        .with_context(|| format!("Error opening network file {:?}", network_file))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Error parsing network file {:?}", network_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.http_address, default_http_address());
        assert_eq!(config.plan_timeout(), Duration::from_millis(500));
        assert!(config.cors_permissive);
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.planner, PlannerConfig::default());
    }

    #[test]
    fn test_nested_overrides() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "http_address": "0.0.0.0:9000",
                "simulation": { "tickIntervalSecs": 5, "seed": 42 },
                "planner": { "maxResults": 3 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.http_address.port(), 9000);
        assert_eq!(config.simulation.tick_interval_secs, 5);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.minutes_per_hop, 2);
        assert_eq!(config.planner.max_results, 3);
    }

    #[test]
    fn test_sample_network_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/addis-network.json");
        let definition = read_network(&path).unwrap();
        assert_eq!(definition.stops.len(), 14);
        assert_eq!(definition.routes.len(), 4);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_config(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("Error opening config file"));
    }
}
