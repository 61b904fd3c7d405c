use crate::common::EventLog;
use crate::domains::delivery::{
    AgentState, DeliveryAgent, FailureReason, MissionEvent, MissionFailure,
};
use crate::domains::grid_world::{GridPosition, GridWorld};
use crate::domains::planning::{MissionMetrics, RoutePlanner};
use crate::domains::replanning::AnnealingReplanner;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MissionOutcome {
    Completed,
    Failed(MissionFailure),
}

/// End-of-mission summary handed to the presentation layer. Partial progress
/// is preserved: a failed mission still reports the deliveries it made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub mission_id: Uuid,
    pub planner: String,
    pub outcome: MissionOutcome,
    pub deliveries_completed: u32,
    pub deliveries_total: u32,
    pub final_position: GridPosition,
    pub remaining_fuel: u32,
    pub final_time_step: u64,
    pub metrics: MissionMetrics,
}

/// Drives the discrete time loop: the world is a pure function of the tick
/// counter owned here, the agent advances one tick at a time, events and
/// metrics are collected along the way.
pub struct MissionController {
    mission_id: Uuid,
    world: GridWorld,
    agent: DeliveryAgent,
    planner: Box<dyn RoutePlanner>,
    replanner: AnnealingReplanner,
    rng: StdRng,
    metrics: MissionMetrics,
    events: EventLog<MissionEvent>,
    max_steps: u64,
}

impl MissionController {
    pub fn new(
        world: GridWorld,
        agent: DeliveryAgent,
        planner: Box<dyn RoutePlanner>,
        replanner: AnnealingReplanner,
        rng: StdRng,
        max_steps: u64,
    ) -> Self {
        Self {
            mission_id: Uuid::new_v4(),
            world,
            agent,
            planner,
            replanner,
            rng,
            metrics: MissionMetrics::new(),
            events: EventLog::new(),
            max_steps,
        }
    }

    pub fn mission_id(&self) -> Uuid {
        self.mission_id
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn agent(&self) -> &DeliveryAgent {
        &self.agent
    }

    pub fn events(&self) -> &EventLog<MissionEvent> {
        &self.events
    }

    pub fn metrics(&self) -> &MissionMetrics {
        &self.metrics
    }

    /// Run the mission to a terminal state and produce the summary.
    pub fn run(&mut self) -> MissionReport {
        tracing::info!(
            mission_id = %self.mission_id,
            planner = self.planner.name(),
            packages = self.agent.deliveries_total(),
            "mission started"
        );
        let started = Instant::now();

        while !self.agent.is_terminal() {
            if self.agent.time_step() >= self.max_steps {
                let event = self.agent.abort(FailureReason::StepLimitReached);
                self.events.record(event);
                break;
            }
            let ticked = self.agent.tick(
                &self.world,
                self.planner.as_ref(),
                &self.replanner,
                &mut self.rng,
                &mut self.metrics,
            );
            for event in ticked {
                self.events.record(event);
            }
        }

        self.metrics.mission_wall_clock = started.elapsed();
        let report = self.report();
        tracing::info!(
            mission_id = %self.mission_id,
            deliveries = report.deliveries_completed,
            total = report.deliveries_total,
            cost = report.metrics.total_path_cost,
            "mission ended"
        );
        report
    }

    fn report(&self) -> MissionReport {
        let outcome = match self.agent.state() {
            AgentState::Failed(failure) => MissionOutcome::Failed(*failure),
            _ => MissionOutcome::Completed,
        };
        MissionReport {
            mission_id: self.mission_id,
            planner: self.planner.name().to_string(),
            outcome,
            deliveries_completed: self.agent.deliveries_completed(),
            deliveries_total: self.agent.deliveries_total(),
            final_position: self.agent.position(),
            remaining_fuel: self.agent.fuel(),
            final_time_step: self.agent.time_step(),
            metrics: self.metrics.clone(),
        }
    }
}
