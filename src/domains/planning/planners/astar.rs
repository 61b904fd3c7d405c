use super::{
    exhausted_failure, reconstruct, FrontierEntry, NodeRecord, PlanRequest, PlanningFailure,
    RoutePlanner,
};
use crate::domains::planning::metrics::MissionMetrics;
use crate::domains::planning::path::Path;
use crate::domains::planning::problem::{SearchProblem, State};
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

/// A*: uniform-cost search ordered by accumulated cost plus the admissible
/// Manhattan-times-cheapest-terrain heuristic.
///
/// Unlike UCS this keeps no hard closed set: an expanded state is re-opened
/// whenever a strictly better cost for it is found later. With time-indexed
/// states the wait edge can surface a cheaper route to an already-expanded
/// (position, time) key, so refusing to re-open would forfeit optimality.
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn plan(
        &self,
        problem: &SearchProblem<'_>,
        request: &PlanRequest,
        metrics: &mut MissionMetrics,
    ) -> Result<Path, PlanningFailure> {
        let started = Instant::now();
        let start = State::new(request.start, request.start_time);
        let start_key = problem.search_key(start);

        let mut records: HashMap<State, NodeRecord> = HashMap::new();
        records.insert(
            start_key,
            NodeRecord {
                state: start,
                parent: None,
                g: 0,
                fuel: 0,
            },
        );
        let mut frontier = BinaryHeap::new();
        let mut tie = 0u64;
        frontier.push(FrontierEntry {
            priority: problem.heuristic(start, request.goal),
            tie,
            key: start_key,
            g: 0,
        });
        let mut fuel_pruned = false;

        while let Some(entry) = frontier.pop() {
            let Some(record) = records.get(&entry.key).copied() else {
                continue;
            };
            if entry.g > record.g {
                // Superseded: a strictly better cost re-opened this state.
                continue;
            }
            metrics.nodes_expanded += 1;

            if problem.is_goal(record.state, request.goal) {
                let states = reconstruct(&records, entry.key);
                metrics.planning_time += started.elapsed();
                tracing::debug!(
                    planner = self.name(),
                    cost = record.g,
                    steps = states.len(),
                    "path found"
                );
                return Ok(Path::new(states, record.g));
            }

            for transition in problem.transitions(record.state) {
                let next_key = problem.search_key(transition.state);
                let fuel = record.fuel + transition.fuel;
                if fuel > request.fuel_budget {
                    fuel_pruned = true;
                    continue;
                }
                let g = record.g + transition.cost;
                let improves = records.get(&next_key).map_or(true, |r| g < r.g);
                if improves {
                    records.insert(
                        next_key,
                        NodeRecord {
                            state: transition.state,
                            parent: Some(entry.key),
                            g,
                            fuel,
                        },
                    );
                    tie += 1;
                    frontier.push(FrontierEntry {
                        priority: g + problem.heuristic(transition.state, request.goal),
                        tie,
                        key: next_key,
                        g,
                    });
                }
            }
        }

        metrics.planning_time += started.elapsed();
        Err(exhausted_failure(fuel_pruned, request))
    }
}
