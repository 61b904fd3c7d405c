// Mission service - wires configuration and a loaded map into a runnable mission
use crate::adapters::inbound::{load_map, MissionMap};
use crate::common::{ApplicationError, ApplicationResult};
use crate::config::Config;
use crate::domains::delivery::DeliveryAgent;
use crate::domains::mission::{MissionController, MissionReport};
use crate::domains::replanning::AnnealingReplanner;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

pub struct MissionService {
    config: Config,
}

impl MissionService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assemble a controller for the given map: configured planner,
    /// replanner and a seeded random source.
    pub fn build_controller(&self, map: MissionMap) -> MissionController {
        let mission = &self.config.mission;
        let agent = DeliveryAgent::new(
            map.start,
            mission.fuel_capacity,
            map.packages,
            mission.wait,
        );
        MissionController::new(
            map.world,
            agent,
            mission.planner.planner(),
            AnnealingReplanner::new(self.config.replanner.clone()),
            StdRng::seed_from_u64(mission.rng_seed),
            mission.max_steps,
        )
    }

    pub fn run_mission(&self, map: MissionMap) -> MissionReport {
        self.build_controller(map).run()
    }

    /// Load a map file and run the mission it describes.
    pub fn load_and_run<P: AsRef<Path>>(&self, path: P) -> ApplicationResult<MissionReport> {
        let map = load_map(path).map_err(|e| ApplicationError::Map(e.to_string()))?;
        Ok(self.run_mission(map))
    }
}
