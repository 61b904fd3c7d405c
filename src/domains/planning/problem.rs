use crate::domains::grid_world::{Direction, GridPosition, GridWorld};
use serde::{Deserialize, Serialize};

/// A search state: the same cell is traversable at one tick and blocked at
/// another, so nodes carry the time step alongside the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub position: GridPosition,
    pub time: u64,
}

impl State {
    pub fn new(position: GridPosition, time: u64) -> Self {
        Self { position, time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitCost {
    /// Waiting costs the terrain cost of the cell the agent stands on.
    Terrain,
    /// Waiting costs a fixed amount per tick.
    Fixed(u32),
}

/// Policy for the wait-in-place transition. Whether waiting burns fuel is an
/// explicit option, not a baked-in rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitRule {
    pub cost: WaitCost,
    pub consumes_fuel: bool,
}

impl Default for WaitRule {
    fn default() -> Self {
        Self {
            cost: WaitCost::Terrain,
            consumes_fuel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: State,
    pub cost: u32,
    pub fuel: u32,
}

/// Adapter exposing a `GridWorld` as a weighted graph over time-indexed
/// states. Purely functional queries, no side effects.
#[derive(Debug, Clone, Copy)]
pub struct SearchProblem<'w> {
    world: &'w GridWorld,
    wait: WaitRule,
}

impl<'w> SearchProblem<'w> {
    pub fn new(world: &'w GridWorld, wait: WaitRule) -> Self {
        Self { world, wait }
    }

    pub fn world(&self) -> &GridWorld {
        self.world
    }

    pub fn wait_rule(&self) -> WaitRule {
        self.wait
    }

    /// Expand a state into its successors: the four cardinal moves plus
    /// waiting in place, skipping any cell occupied at the arrival tick.
    /// The wait transition is only generated while dynamic obstacles are
    /// still scheduled; once the world has gone static, waiting can never
    /// open up a cheaper route.
    pub fn transitions(&self, state: State) -> Vec<Transition> {
        let arrival = state.time + 1;
        let mut out = Vec::with_capacity(5);
        for direction in Direction::CARDINAL {
            let position = state.position.offset(direction);
            if let Some(cost) = self.world.passable_cost(position, arrival) {
                out.push(Transition {
                    state: State::new(position, arrival),
                    cost,
                    fuel: cost,
                });
            }
        }
        if state.time < self.world.dynamic_horizon() {
            if let Some(transition) = self.wait_transition(state) {
                out.push(transition);
            }
        }
        out
    }

    fn wait_transition(&self, state: State) -> Option<Transition> {
        let arrival = state.time + 1;
        let terrain = self.world.passable_cost(state.position, arrival)?;
        let cost = match self.wait.cost {
            WaitCost::Terrain => terrain,
            WaitCost::Fixed(c) => c,
        };
        let fuel = if self.wait.consumes_fuel { cost } else { 0 };
        Some(Transition {
            state: State::new(state.position, arrival),
            cost,
            fuel,
        })
    }

    /// The edge between a state and an adjacent-or-equal next position, if it
    /// exists under the current obstacles. Unlike `transitions` this accepts
    /// waits past the dynamic horizon, so committed paths containing late
    /// waits still validate.
    pub fn edge(&self, from: State, to: GridPosition) -> Option<Transition> {
        let arrival = from.time + 1;
        let terrain = self.world.passable_cost(to, arrival)?;
        if to == from.position {
            let cost = match self.wait.cost {
                WaitCost::Terrain => terrain,
                WaitCost::Fixed(c) => c,
            };
            let fuel = if self.wait.consumes_fuel { cost } else { 0 };
            Some(Transition {
                state: State::new(to, arrival),
                cost,
                fuel,
            })
        } else if from.position.is_adjacent_to(to) {
            Some(Transition {
                state: State::new(to, arrival),
                cost: terrain,
                fuel: terrain,
            })
        } else {
            None
        }
    }

    /// Goal test ignores time: any tick at the goal cell counts.
    pub fn is_goal(&self, state: State, goal: GridPosition) -> bool {
        state.position == goal
    }

    /// Manhattan distance scaled by the cheapest terrain on the map. Every
    /// move costs at least the minimum terrain cost and waits only add, so
    /// this never overestimates the true remaining cost.
    pub fn heuristic(&self, state: State, goal: GridPosition) -> u32 {
        state.position.manhattan_distance(goal) * self.world.min_terrain_cost()
    }

    /// Closed-set key for a state. Beyond the dynamic horizon the world no
    /// longer changes, so the time dimension is collapsed there; without this
    /// the wait edge would make the state space unbounded.
    pub fn search_key(&self, state: State) -> State {
        State::new(state.position, state.time.min(self.world.dynamic_horizon()))
    }

    /// Fuel the agent actually burns along a path (waits may be free).
    /// `None` if any step is not a legal edge.
    pub fn path_fuel(&self, states: &[State]) -> Option<u32> {
        let mut total = 0u32;
        for pair in states.windows(2) {
            let transition = self.edge(pair[0], pair[1].position)?;
            if transition.state.time != pair[1].time {
                return None;
            }
            total = total.checked_add(transition.fuel)?;
        }
        Some(total)
    }

    /// Re-validate a candidate path step by step against the world: correct
    /// timing, legal adjacency, no step through an occupied cell, exact cost
    /// accounting and the fuel budget. Repaired paths must pass this before
    /// the agent is allowed to commit to them.
    pub fn validate_path(&self, path: &super::path::Path, fuel_budget: u32) -> bool {
        let states = path.states();
        let Some(first) = states.first() else {
            return false;
        };
        if self.world.passable_cost(first.position, first.time).is_none() {
            return false;
        }
        let mut cost = 0u64;
        let mut fuel = 0u64;
        for pair in states.windows(2) {
            let Some(transition) = self.edge(pair[0], pair[1].position) else {
                return false;
            };
            if transition.state.time != pair[1].time {
                return false;
            }
            cost += u64::from(transition.cost);
            fuel += u64::from(transition.fuel);
        }
        cost == u64::from(path.cost()) && fuel <= u64::from(fuel_budget)
    }
}
