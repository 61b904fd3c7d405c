use peregrine_app::domains::grid_world::{DynamicObstacle, GridPosition, GridWorld, ScheduledCell};
use peregrine_app::domains::planning::{
    AStarPlanner, BfsPlanner, MissionMetrics, PlanRequest, PlanningFailure, RoutePlanner,
    SearchProblem, State, UcsPlanner, WaitCost, WaitRule,
};

fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

fn run(
    planner: &dyn RoutePlanner,
    problem: &SearchProblem<'_>,
    request: &PlanRequest,
) -> (
    Result<peregrine_app::domains::planning::Path, PlanningFailure>,
    MissionMetrics,
) {
    let mut metrics = MissionMetrics::new();
    let result = planner.plan(problem, request, &mut metrics);
    (result, metrics)
}

#[cfg(test)]
mod optimality_tests {
    use super::*;

    #[test]
    fn test_planners_agree_on_uniform_grid() {
        let world = GridWorld::uniform(10, 10, 1).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(0, 0), pos(9, 9), 0, 1_000);

        let (bfs, _) = run(&BfsPlanner, &problem, &request);
        let (ucs, _) = run(&UcsPlanner, &problem, &request);
        let (astar, _) = run(&AStarPlanner, &problem, &request);

        let bfs = bfs.unwrap();
        let ucs = ucs.unwrap();
        let astar = astar.unwrap();

        assert_eq!(bfs.cost(), 18);
        assert_eq!(ucs.cost(), 18);
        assert_eq!(astar.cost(), 18);
    }

    #[test]
    fn test_astar_expands_no_more_nodes_than_ucs() {
        let world = GridWorld::uniform(10, 10, 1).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(0, 0), pos(9, 9), 0, 1_000);

        let (_, ucs_metrics) = run(&UcsPlanner, &problem, &request);
        let (_, astar_metrics) = run(&AStarPlanner, &problem, &request);

        assert!(astar_metrics.nodes_expanded <= ucs_metrics.nodes_expanded);
        assert!(astar_metrics.nodes_expanded > 0);
    }

    #[test]
    fn test_bfs_fewest_moves_ucs_lowest_cost() {
        // Direct row is short but expensive, the detour through the second
        // row is longer but cheap.
        let rows = vec![vec![1, 9, 1], vec![1, 1, 1]];
        let world = GridWorld::from_rows(rows, &[], Vec::new()).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(0, 0), pos(2, 0), 0, 1_000);

        let (bfs, _) = run(&BfsPlanner, &problem, &request);
        let (ucs, _) = run(&UcsPlanner, &problem, &request);

        let bfs = bfs.unwrap();
        let ucs = ucs.unwrap();

        assert_eq!(bfs.len(), 3);
        assert_eq!(bfs.cost(), 10);
        assert_eq!(ucs.cost(), 4);
        assert_eq!(ucs.len(), 5);
    }

    #[test]
    fn test_path_cost_equals_sum_of_edge_costs() {
        let rows = vec![vec![1, 9, 1], vec![1, 2, 1], vec![3, 1, 1]];
        let world = GridWorld::from_rows(rows, &[], Vec::new()).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(0, 0), pos(2, 2), 0, 1_000);

        let (result, _) = run(&UcsPlanner, &problem, &request);
        let path = result.unwrap();

        let mut recomputed = 0;
        for pair in path.states().windows(2) {
            recomputed += world.cost_of(pair[1].position).unwrap();
        }
        assert_eq!(path.cost(), recomputed);
    }

    #[test]
    fn test_heuristic_never_overestimates() {
        let rows = vec![vec![2, 9, 2], vec![2, 3, 2], vec![4, 2, 2]];
        let world = GridWorld::from_rows(rows, &[], Vec::new()).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let goal = pos(2, 2);
        let request = PlanRequest::new(pos(0, 0), goal, 0, 1_000);

        let (result, _) = run(&UcsPlanner, &problem, &request);
        let optimal = result.unwrap().cost();

        assert!(problem.heuristic(State::new(pos(0, 0), 0), goal) <= optimal);
    }

    #[test]
    fn test_planning_is_idempotent() {
        let world = GridWorld::uniform(8, 8, 1).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(1, 2), pos(6, 5), 0, 1_000);

        let (first, _) = run(&AStarPlanner, &problem, &request);
        let (second, _) = run(&AStarPlanner, &problem, &request);

        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.states(), second.states());
        assert_eq!(first.cost(), second.cost());
    }

    #[test]
    fn test_trivial_plan_when_start_is_goal() {
        let world = GridWorld::uniform(4, 4, 1).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(2, 2), pos(2, 2), 5, 10);

        let (result, _) = run(&AStarPlanner, &problem, &request);
        let path = result.unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.cost(), 0);
        assert_eq!(path.first().unwrap(), State::new(pos(2, 2), 5));
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[test]
    fn test_walled_goal_is_unreachable() {
        let rows = vec![vec![1; 5]; 5];
        let walls = [pos(3, 4), pos(4, 3), pos(3, 3)];
        let world = GridWorld::from_rows(rows, &walls, Vec::new()).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let request = PlanRequest::new(pos(0, 0), pos(4, 4), 0, 1_000);

        for planner in [
            &BfsPlanner as &dyn RoutePlanner,
            &UcsPlanner,
            &AStarPlanner,
        ] {
            let (result, _) = run(planner, &problem, &request);
            assert_eq!(
                result.unwrap_err(),
                PlanningFailure::Unreachable { goal: pos(4, 4) },
                "planner {} should report Unreachable",
                planner.name()
            );
        }
    }

    #[test]
    fn test_fuel_exhausted_is_distinct_from_unreachable() {
        let rows = vec![vec![1, 5, 5]];
        let world = GridWorld::from_rows(rows, &[], Vec::new()).unwrap();
        let problem = SearchProblem::new(&world, WaitRule::default());

        let broke = PlanRequest::new(pos(0, 0), pos(2, 0), 0, 3);
        let (result, _) = run(&AStarPlanner, &problem, &broke);
        assert_eq!(
            result.unwrap_err(),
            PlanningFailure::FuelExhausted {
                goal: pos(2, 0),
                budget: 3
            }
        );

        let funded = PlanRequest::new(pos(0, 0), pos(2, 0), 0, 100);
        let (result, _) = run(&AStarPlanner, &problem, &funded);
        assert_eq!(result.unwrap().cost(), 10);
    }
}

#[cfg(test)]
mod dynamic_obstacle_tests {
    use super::*;

    fn world_with_obstacle_at_4_4_tick_8() -> GridWorld {
        let obstacle = DynamicObstacle::new(
            "bus",
            vec![ScheduledCell {
                position: pos(4, 4),
                time_step: 8,
            }],
        );
        let rows = vec![vec![1; 10]; 10];
        GridWorld::from_rows(rows, &[], vec![obstacle]).unwrap()
    }

    #[test]
    fn test_scheduled_obstacle_forces_wait_or_detour() {
        let world = world_with_obstacle_at_4_4_tick_8();
        let problem = SearchProblem::new(&world, WaitRule::default());
        // Heading right along y = 4 from tick 4 would cross (4, 4) at
        // exactly tick 8.
        let request = PlanRequest::new(pos(0, 4), pos(8, 4), 4, 100);

        let (result, _) = run(&AStarPlanner, &problem, &request);
        let path = result.unwrap();

        assert!(!path.states().contains(&State::new(pos(4, 4), 8)));
        // One wait beats the two-step detour, and both beat crossing.
        assert_eq!(path.cost(), 9);
        assert!(path.cost() >= 8);
    }

    #[test]
    fn test_forced_wait_fuel_follows_policy() {
        // Single-row corridor with the middle cell closed at tick 2: the
        // only option is to wait one tick somewhere before it.
        let obstacle = DynamicObstacle::new(
            "cart",
            vec![ScheduledCell {
                position: pos(2, 0),
                time_step: 2,
            }],
        );
        let rows = vec![vec![1, 1, 1, 1, 1]];
        let world = GridWorld::from_rows(rows, &[], vec![obstacle]).unwrap();
        let request = PlanRequest::new(pos(0, 0), pos(4, 0), 0, 100);

        let free_wait = SearchProblem::new(
            &world,
            WaitRule {
                cost: WaitCost::Terrain,
                consumes_fuel: false,
            },
        );
        let (result, _) = run(&AStarPlanner, &free_wait, &request);
        let path = result.unwrap();
        assert_eq!(path.cost(), 5);
        assert_eq!(free_wait.path_fuel(path.states()), Some(4));

        let paid_wait = SearchProblem::new(&world, WaitRule::default());
        let (result, _) = run(&AStarPlanner, &paid_wait, &request);
        let path = result.unwrap();
        assert_eq!(path.cost(), 5);
        assert_eq!(paid_wait.path_fuel(path.states()), Some(5));
    }
}
