use crate::domains::grid_world::{Direction, GridPosition};
use crate::domains::planning::{
    MissionMetrics, Path, PlanRequest, PlanningFailure, RoutePlanner, SearchProblem,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Cost penalty for a candidate step through a cell occupied at that tick.
/// Steers the local search away from obstacles without making the score
/// infinite; the final validation still rejects any residual violation.
const BLOCKED_PENALTY: u64 = 1_000;

/// Expansion cap for the bounded segment re-route search.
const SEGMENT_SEARCH_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplannerConfig {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub max_iterations: u32,
    /// Consecutive non-improving iterations before the search is considered
    /// stuck on a plateau and stops early.
    pub plateau_window: u32,
}

impl Default for ReplannerConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1_000.0,
            cooling_rate: 0.95,
            max_iterations: 400,
            plateau_window: 60,
        }
    }
}

/// Local-search path repair with a simulated-annealing acceptance criterion.
///
/// Invoked when a committed path has been invalidated mid-execution. Starts
/// from the still-valid prefix, mutates the remaining suffix with randomized
/// local moves (segment re-routes, wait insertion/removal), always accepts
/// improving variants and worsening ones with probability exp(-Δ/T) under a
/// geometrically cooling temperature. The best variant is re-validated step
/// by step against the world before it is returned; if local search finds
/// nothing feasible within budget, the full planner is run as a correctness
/// safety net, so a stalled local search can never silently commit the agent
/// to an infeasible path.
#[derive(Debug, Clone)]
pub struct AnnealingReplanner {
    config: ReplannerConfig,
}

impl AnnealingReplanner {
    pub fn new(config: ReplannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplannerConfig {
        &self.config
    }

    /// Repair `committed` from the step the agent has executed up to.
    /// Randomness comes from the injected `rng` only, so a seeded generator
    /// makes the repair fully deterministic.
    #[allow(clippy::too_many_arguments)]
    pub fn repair<R: Rng>(
        &self,
        problem: &SearchProblem<'_>,
        committed: &Path,
        steps_taken: usize,
        fuel_remaining: u32,
        rng: &mut R,
        fallback: &dyn RoutePlanner,
        metrics: &mut MissionMetrics,
    ) -> Result<Path, PlanningFailure> {
        let states = committed.states();
        let (Some(current), Some(goal_state)) = (states.get(steps_taken), states.last()) else {
            return self.fall_back(problem, committed, steps_taken, fuel_remaining, fallback, metrics);
        };
        let start_time = current.time;
        let goal = goal_state.position;

        let mut route: Vec<GridPosition> =
            states[steps_taken..].iter().map(|s| s.position).collect();
        let mut score = self.score(problem, &route, start_time);
        let mut best_route = route.clone();
        let mut best_score = score;

        let mut temperature = self.config.initial_temperature;
        let mut plateau = 0u32;

        for _ in 0..self.config.max_iterations {
            if plateau >= self.config.plateau_window {
                break;
            }
            let Some(candidate) = self.propose(problem, &route, rng, metrics) else {
                plateau += 1;
                temperature = (temperature * self.config.cooling_rate).max(1e-9);
                continue;
            };
            let candidate_score = self.score(problem, &candidate, start_time);

            let accept = if candidate_score < score {
                true
            } else {
                let delta = (candidate_score - score) as f64;
                rng.gen::<f64>() < (-delta / temperature).exp()
            };
            if accept {
                route = candidate;
                score = candidate_score;
            }
            if score < best_score {
                best_route = route.clone();
                best_score = score;
                plateau = 0;
            } else {
                plateau += 1;
            }
            temperature = (temperature * self.config.cooling_rate).max(1e-9);
        }

        if best_route.last() == Some(&goal) {
            if let Some(path) = Path::trace(problem, &best_route, start_time) {
                if problem.validate_path(&path, fuel_remaining) {
                    tracing::debug!(cost = path.cost(), steps = path.len(), "local repair accepted");
                    return Ok(path);
                }
            }
        }

        tracing::debug!("local repair found no feasible path, invoking fallback planner");
        self.fall_back(problem, committed, steps_taken, fuel_remaining, fallback, metrics)
    }

    fn fall_back(
        &self,
        problem: &SearchProblem<'_>,
        committed: &Path,
        steps_taken: usize,
        fuel_remaining: u32,
        fallback: &dyn RoutePlanner,
        metrics: &mut MissionMetrics,
    ) -> Result<Path, PlanningFailure> {
        let states = committed.states();
        let (Some(current), Some(goal_state)) = (states.get(steps_taken), states.last()) else {
            return Err(PlanningFailure::ReplanFailed {
                reason: "committed path has no remaining states".to_string(),
            });
        };
        let request = PlanRequest::new(
            current.position,
            goal_state.position,
            current.time,
            fuel_remaining,
        );
        fallback
            .plan(problem, &request, metrics)
            .map_err(|failure| PlanningFailure::ReplanFailed {
                reason: failure.to_string(),
            })
    }

    /// Penalized cost of a candidate route: exact edge costs where the route
    /// is legal, a large penalty per step through an occupied or illegal
    /// cell. Lower is better.
    fn score(&self, problem: &SearchProblem<'_>, route: &[GridPosition], start_time: u64) -> u64 {
        if route.len() < 2 {
            return 0;
        }
        let mut total = 0u64;
        let mut time = start_time;
        for pair in route.windows(2) {
            let state = crate::domains::planning::State::new(pair[0], time);
            match problem.edge(state, pair[1]) {
                Some(transition) => total += u64::from(transition.cost),
                None => total += BLOCKED_PENALTY,
            }
            time += 1;
        }
        total
    }

    fn propose<R: Rng>(
        &self,
        problem: &SearchProblem<'_>,
        route: &[GridPosition],
        rng: &mut R,
        metrics: &mut MissionMetrics,
    ) -> Option<Vec<GridPosition>> {
        match rng.gen_range(0..3) {
            0 => self.reroute_segment(problem, route, rng, metrics),
            1 => self.insert_wait(route, rng),
            _ => self.remove_wait(route, rng),
        }
    }

    /// Replace a random slice of the route with an alternative found by a
    /// bounded breadth-first search over positions. The interior of the
    /// replaced slice is avoided so the proposal actually detours.
    fn reroute_segment<R: Rng>(
        &self,
        problem: &SearchProblem<'_>,
        route: &[GridPosition],
        rng: &mut R,
        metrics: &mut MissionMetrics,
    ) -> Option<Vec<GridPosition>> {
        if route.len() < 3 {
            return None;
        }
        let from = rng.gen_range(0..route.len() - 2);
        let to = (from + 1 + rng.gen_range(1..4)).min(route.len() - 1);
        let avoid: HashSet<GridPosition> = route[from + 1..to].iter().copied().collect();

        let detour = self.segment_route(problem, route[from], route[to], &avoid, metrics)?;
        let mut candidate = route[..=from].to_vec();
        candidate.extend(detour);
        candidate.extend_from_slice(&route[to + 1..]);
        Some(candidate)
    }

    /// Small position-space BFS between two route cells, ignoring the
    /// schedule (timing violations are handled by the score and the final
    /// validation). Returns the positions after `from` up to and including
    /// `to`.
    fn segment_route(
        &self,
        problem: &SearchProblem<'_>,
        from: GridPosition,
        to: GridPosition,
        avoid: &HashSet<GridPosition>,
        metrics: &mut MissionMetrics,
    ) -> Option<Vec<GridPosition>> {
        let world = problem.world();
        let mut parents: HashMap<GridPosition, GridPosition> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        parents.insert(from, from);
        let mut expanded = 0usize;

        while let Some(position) = queue.pop_front() {
            expanded += 1;
            metrics.nodes_expanded += 1;
            if position == to {
                let mut segment = Vec::new();
                let mut cursor = to;
                while cursor != from {
                    segment.push(cursor);
                    cursor = *parents.get(&cursor)?;
                }
                segment.reverse();
                return Some(segment);
            }
            if expanded >= SEGMENT_SEARCH_LIMIT {
                return None;
            }
            for direction in Direction::CARDINAL {
                let next = position.offset(direction);
                if parents.contains_key(&next) {
                    continue;
                }
                if next != to && avoid.contains(&next) {
                    continue;
                }
                if world.static_cost(next).is_none() {
                    continue;
                }
                parents.insert(next, position);
                queue.push_back(next);
            }
        }
        None
    }

    fn insert_wait<R: Rng>(&self, route: &[GridPosition], rng: &mut R) -> Option<Vec<GridPosition>> {
        if route.is_empty() {
            return None;
        }
        let at = rng.gen_range(0..route.len());
        let mut candidate = route.to_vec();
        candidate.insert(at + 1, route[at]);
        Some(candidate)
    }

    fn remove_wait<R: Rng>(&self, route: &[GridPosition], rng: &mut R) -> Option<Vec<GridPosition>> {
        let waits: Vec<usize> = route
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] == pair[1])
            .map(|(i, _)| i + 1)
            .collect();
        if waits.is_empty() {
            return None;
        }
        let at = waits[rng.gen_range(0..waits.len())];
        let mut candidate = route.to_vec();
        candidate.remove(at);
        Some(candidate)
    }
}
