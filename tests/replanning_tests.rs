use peregrine_app::domains::grid_world::{DynamicObstacle, GridPosition, GridWorld, ScheduledCell};
use peregrine_app::domains::planning::{
    AStarPlanner, MissionMetrics, Path, PlanningFailure, SearchProblem, State, WaitRule,
};
use peregrine_app::domains::replanning::{AnnealingReplanner, ReplannerConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

/// A straight committed route along y = 4 from tick 4, planned before the
/// obstacle at (4, 4) tick 8 was known.
fn committed_straight_path(problem: &SearchProblem<'_>) -> Path {
    let positions: Vec<GridPosition> = (0..=8).map(|x| pos(x, 4)).collect();
    Path::trace(problem, &positions, 4).unwrap()
}

fn world_with_obstacle() -> GridWorld {
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

#[cfg(test)]
mod repair_tests {
    use super::*;

    #[test]
    fn test_repair_avoids_newly_known_obstacle() {
        let free_world = GridWorld::uniform(10, 10, 1).unwrap();
        let free_problem = SearchProblem::new(&free_world, WaitRule::default());
        let committed = committed_straight_path(&free_problem);
        assert!(committed
            .states()
            .contains(&State::new(pos(4, 4), 8)));

        let world = world_with_obstacle();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let replanner = AnnealingReplanner::new(ReplannerConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let mut metrics = MissionMetrics::new();

        let repaired = replanner
            .repair(
                &problem,
                &committed,
                0,
                100,
                &mut rng,
                &AStarPlanner,
                &mut metrics,
            )
            .unwrap();

        assert!(!repaired.states().contains(&State::new(pos(4, 4), 8)));
        assert_eq!(repaired.first().unwrap(), State::new(pos(0, 4), 4));
        assert_eq!(repaired.goal().unwrap().position, pos(8, 4));
        // Repair never beats the unobstructed optimum.
        assert!(repaired.cost() >= 8);
        assert!(problem.validate_path(&repaired, 100));
    }

    #[test]
    fn test_repair_respects_executed_prefix() {
        let free_world = GridWorld::uniform(10, 10, 1).unwrap();
        let free_problem = SearchProblem::new(&free_world, WaitRule::default());
        let committed = committed_straight_path(&free_problem);

        let world = world_with_obstacle();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let replanner = AnnealingReplanner::new(ReplannerConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let mut metrics = MissionMetrics::new();

        // The agent has already executed two steps and stands at (2, 4).
        let repaired = replanner
            .repair(
                &problem,
                &committed,
                2,
                100,
                &mut rng,
                &AStarPlanner,
                &mut metrics,
            )
            .unwrap();

        assert_eq!(repaired.first().unwrap(), State::new(pos(2, 4), 6));
        assert!(!repaired.states().contains(&State::new(pos(4, 4), 8)));
        assert!(problem.validate_path(&repaired, 100));
    }

    #[test]
    fn test_every_repaired_step_is_unoccupied() {
        let free_world = GridWorld::uniform(10, 10, 1).unwrap();
        let free_problem = SearchProblem::new(&free_world, WaitRule::default());
        let committed = committed_straight_path(&free_problem);

        let world = world_with_obstacle();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let replanner = AnnealingReplanner::new(ReplannerConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let mut metrics = MissionMetrics::new();

        let repaired = replanner
            .repair(
                &problem,
                &committed,
                0,
                100,
                &mut rng,
                &AStarPlanner,
                &mut metrics,
            )
            .unwrap();

        for state in repaired.states() {
            assert!(
                world.passable_cost(state.position, state.time).is_some(),
                "repaired path steps through {} at tick {}",
                state.position,
                state.time
            );
        }
    }

    #[test]
    fn test_repair_is_deterministic_for_a_seed() {
        let free_world = GridWorld::uniform(10, 10, 1).unwrap();
        let free_problem = SearchProblem::new(&free_world, WaitRule::default());
        let committed = committed_straight_path(&free_problem);

        let world = world_with_obstacle();
        let problem = SearchProblem::new(&world, WaitRule::default());
        let replanner = AnnealingReplanner::new(ReplannerConfig::default());

        let mut paths = Vec::new();
        for _ in 0..2 {
            let mut rng = StdRng::seed_from_u64(99);
            let mut metrics = MissionMetrics::new();
            let repaired = replanner
                .repair(
                    &problem,
                    &committed,
                    0,
                    100,
                    &mut rng,
                    &AStarPlanner,
                    &mut metrics,
                )
                .unwrap();
            paths.push(repaired);
        }

        assert_eq!(paths[0].states(), paths[1].states());
        assert_eq!(paths[0].cost(), paths[1].cost());
    }

    #[test]
    fn test_repair_and_fallback_both_failing_is_replan_failed() {
        // Corridor committed while open, then permanently walled shut: no
        // repair can exist and the fallback planner fails too.
        let open_rows = vec![vec![1, 1, 1, 1, 1]];
        let open_world = GridWorld::from_rows(open_rows, &[], Vec::new()).unwrap();
        let open_problem = SearchProblem::new(&open_world, WaitRule::default());
        let positions: Vec<GridPosition> = (0..=4).map(|x| pos(x, 0)).collect();
        let committed = Path::trace(&open_problem, &positions, 0).unwrap();

        let walled_rows = vec![vec![1, 1, 1, 1, 1]];
        let walled_world =
            GridWorld::from_rows(walled_rows, &[pos(2, 0)], Vec::new()).unwrap();
        let problem = SearchProblem::new(&walled_world, WaitRule::default());
        let replanner = AnnealingReplanner::new(ReplannerConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        let mut metrics = MissionMetrics::new();

        let result = replanner.repair(
            &problem,
            &committed,
            0,
            100,
            &mut rng,
            &AStarPlanner,
            &mut metrics,
        );

        assert!(matches!(
            result.unwrap_err(),
            PlanningFailure::ReplanFailed { .. }
        ));
    }
}
