use super::{exhausted_failure, reconstruct, NodeRecord, PlanRequest, PlanningFailure, RoutePlanner};
use crate::domains::planning::metrics::MissionMetrics;
use crate::domains::planning::path::Path;
use crate::domains::planning::problem::{SearchProblem, State};
use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Breadth-first search: every edge treated as one move, states explored in
/// discovery order. Guarantees the fewest moves, not the lowest terrain
/// cost; the returned path still reports its true accumulated cost.
pub struct BfsPlanner;

impl RoutePlanner for BfsPlanner {
    fn name(&self) -> &'static str {
        "bfs"
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
        let mut queue = VecDeque::new();
        queue.push_back(start_key);
        let mut fuel_pruned = false;

        while let Some(key) = queue.pop_front() {
            let Some(record) = records.get(&key).copied() else {
                continue;
            };
            metrics.nodes_expanded += 1;

            if problem.is_goal(record.state, request.goal) {
                let states = reconstruct(&records, key);
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
                if records.contains_key(&next_key) {
                    continue;
                }
                let fuel = record.fuel + transition.fuel;
                if fuel > request.fuel_budget {
                    fuel_pruned = true;
                    continue;
                }
                records.insert(
                    next_key,
                    NodeRecord {
                        state: transition.state,
                        parent: Some(key),
                        g: record.g + transition.cost,
                        fuel,
                    },
                );
                queue.push_back(next_key);
            }
        }

        metrics.planning_time += started.elapsed();
        Err(exhausted_failure(fuel_pruned, request))
    }
}
