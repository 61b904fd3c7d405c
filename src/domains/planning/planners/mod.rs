pub mod astar;
pub mod bfs;
pub mod ucs;

pub use astar::AStarPlanner;
pub use bfs::BfsPlanner;
pub use ucs::UcsPlanner;

use super::metrics::MissionMetrics;
use super::path::Path;
use super::problem::{SearchProblem, State};
use crate::domains::grid_world::GridPosition;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

/// Planning is fallible by design: these are tagged outcomes the agent reacts
/// to, never panics. `FuelExhausted` is kept distinct from `Unreachable` so
/// "no route" and "too expensive" feed different reactions and metrics.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanningFailure {
    #[error("no feasible path to {goal}")]
    Unreachable { goal: GridPosition },

    #[error("every route to {goal} exceeds the fuel budget of {budget}")]
    FuelExhausted { goal: GridPosition, budget: u32 },

    #[error("path repair and fallback planning both failed: {reason}")]
    ReplanFailed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub start: GridPosition,
    pub goal: GridPosition,
    pub start_time: u64,
    pub fuel_budget: u32,
}

impl PlanRequest {
    pub fn new(start: GridPosition, goal: GridPosition, start_time: u64, fuel_budget: u32) -> Self {
        Self {
            start,
            goal,
            start_time,
            fuel_budget,
        }
    }
}

/// The shared planner contract. Implementations record nodes expanded and
/// elapsed planning time into the mission metrics on every call, success or
/// failure.
pub trait RoutePlanner: Send + Sync {
    fn name(&self) -> &'static str;

    fn plan(
        &self,
        problem: &SearchProblem<'_>,
        request: &PlanRequest,
        metrics: &mut MissionMetrics,
    ) -> Result<Path, PlanningFailure>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerKind {
    Bfs,
    Ucs,
    AStar,
}

impl PlannerKind {
    pub fn planner(&self) -> Box<dyn RoutePlanner> {
        match self {
            PlannerKind::Bfs => Box::new(BfsPlanner),
            PlannerKind::Ucs => Box::new(UcsPlanner),
            PlannerKind::AStar => Box::new(AStarPlanner),
        }
    }
}

impl std::fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlannerKind::Bfs => "bfs",
            PlannerKind::Ucs => "ucs",
            PlannerKind::AStar => "astar",
        };
        write!(f, "{}", name)
    }
}

/// Bookkeeping per discovered state key: the concrete (possibly
/// time-clamped-for-keying) state, the key it was reached from, the
/// accumulated true cost and the fuel burned to get there.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeRecord {
    pub state: State,
    pub parent: Option<State>,
    pub g: u32,
    pub fuel: u32,
}

pub(crate) fn reconstruct(records: &HashMap<State, NodeRecord>, goal_key: State) -> Vec<State> {
    let mut states = Vec::new();
    let mut key = Some(goal_key);
    while let Some(record) = key.and_then(|k| records.get(&k)) {
        states.push(record.state);
        key = record.parent;
    }
    states.reverse();
    states
}

/// Frontier entry ordered so that `BinaryHeap::pop` yields the lowest
/// priority first, and among equal priorities the earliest-pushed entry.
/// The monotonic tie counter is what makes planning reproducible.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrontierEntry {
    pub priority: u32,
    pub tie: u64,
    pub key: State,
    pub g: u32,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.tie == other.tie
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

pub(crate) fn exhausted_failure(
    fuel_pruned: bool,
    request: &PlanRequest,
) -> PlanningFailure {
    if fuel_pruned {
        PlanningFailure::FuelExhausted {
            goal: request.goal,
            budget: request.fuel_budget,
        }
    } else {
        PlanningFailure::Unreachable { goal: request.goal }
    }
}
