use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Read-only mission counters, one instance per mission. Planners record
/// search effort, the replanner its repair attempts, the agent the cost of
/// the steps actually taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionMetrics {
    pub nodes_expanded: u64,
    pub planning_time: Duration,
    pub replanning_events: u64,
    pub total_path_cost: u64,
    pub mission_wall_clock: Duration,
}

impl MissionMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}
