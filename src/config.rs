use crate::domains::planning::{PlannerKind, WaitRule};
use crate::domains::replanning::ReplannerConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mission: MissionConfig,
    #[serde(default)]
    pub replanner: ReplannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionConfig {
    pub planner: PlannerKind,
    pub fuel_capacity: u32,
    /// Backstop on mission length; a run that somehow never terminates on
    /// its own is aborted at this tick.
    pub max_steps: u64,
    /// Seed for the replanner's random source. Same seed, same repairs.
    pub rng_seed: u64,
    #[serde(default)]
    pub wait: WaitRule,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mission: MissionConfig {
                planner: PlannerKind::AStar,
                fuel_capacity: 1_000,
                max_steps: 1_000,
                rng_seed: 42,
                wait: WaitRule::default(),
            },
            replanner: ReplannerConfig::default(),
        }
    }
}
