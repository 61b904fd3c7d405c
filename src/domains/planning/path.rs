use super::problem::{SearchProblem, State};
use crate::domains::grid_world::GridPosition;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed route through time-indexed states. Immutable once built: the
/// agent replaces a path wholesale, it never edits one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    id: Uuid,
    states: Vec<State>,
    cost: u32,
}

impl Path {
    pub fn new(states: Vec<State>, cost: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            states,
            cost,
        }
    }

    /// Build a path from a position sequence starting at `start_time`,
    /// computing the exact edge costs from the problem. `None` if any
    /// consecutive pair is not a legal edge at its tick.
    pub fn trace(
        problem: &SearchProblem<'_>,
        positions: &[GridPosition],
        start_time: u64,
    ) -> Option<Self> {
        let first = *positions.first()?;
        let mut states = Vec::with_capacity(positions.len());
        let mut current = State::new(first, start_time);
        states.push(current);
        let mut cost = 0u32;
        for &position in &positions[1..] {
            let transition = problem.edge(current, position)?;
            cost = cost.checked_add(transition.cost)?;
            current = transition.state;
            states.push(current);
        }
        Some(Self::new(states, cost))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<State> {
        self.states.first().copied()
    }

    pub fn goal(&self) -> Option<State> {
        self.states.last().copied()
    }

    pub fn positions(&self) -> Vec<GridPosition> {
        self.states.iter().map(|s| s.position).collect()
    }
}
