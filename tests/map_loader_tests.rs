use peregrine_app::adapters::inbound::{load_map, parse_map, MapError};
use peregrine_app::common::DomainError;
use peregrine_app::domains::grid_world::GridPosition;
use std::io::Write;

fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

const SMALL_MAP: &str = "\
# demo map
5 4
START 0 0
TERRAIN
1 1 2 1 1
1 1 2 1 1
1 1 1 1 1
1 3 1 1 1
OBSTACLES
3 1
PACKAGES
1 1 4 3
DYNAMIC_OBSTACLES
PATH 2 2 2 3
TIMES 4 5
";

#[cfg(test)]
mod loader_tests {
    use super::*;

    #[test]
    fn test_load_map_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL_MAP.as_bytes()).unwrap();

        let map = load_map(file.path()).unwrap();

        assert_eq!(map.world.width(), 5);
        assert_eq!(map.world.height(), 4);
        assert_eq!(map.start, pos(0, 0));
        assert_eq!(map.packages.len(), 1);
        assert_eq!(map.packages[0].id, 0);
        assert_eq!(map.packages[0].pickup, pos(1, 1));
        assert_eq!(map.packages[0].delivery, pos(4, 3));
    }

    #[test]
    fn test_parsed_world_answers_queries() {
        let map = parse_map(SMALL_MAP).unwrap();

        assert_eq!(map.world.cost_of(pos(2, 0)).unwrap(), 2);
        assert_eq!(map.world.cost_of(pos(1, 3)).unwrap(), 3);
        assert!(map.world.is_blocked(pos(3, 1), 0).unwrap());
        assert!(map.world.is_blocked(pos(2, 2), 4).unwrap());
        assert!(map.world.is_blocked(pos(2, 3), 5).unwrap());
        assert!(!map.world.is_blocked(pos(2, 2), 5).unwrap());
        assert_eq!(map.world.dynamic_horizon(), 6);
        assert_eq!(map.world.dynamic_obstacles().len(), 1);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = "# header comment\n\n3 1\n\n# terrain next\nTERRAIN\n1 1 1\n";
        let map = parse_map(text).unwrap();
        assert_eq!(map.world.width(), 3);
        assert_eq!(map.world.height(), 1);
        assert!(map.packages.is_empty());
    }

    #[test]
    fn test_missing_terrain_block_is_rejected() {
        let result = parse_map("4 4\nSTART 1 1\n");
        assert!(matches!(result.unwrap_err(), MapError::MissingBlock("TERRAIN")));
    }

    #[test]
    fn test_path_without_times_reports_the_line() {
        let text = "2 1\nTERRAIN\n1 1\nDYNAMIC_OBSTACLES\nPATH 0 0\n";
        match parse_map(text).unwrap_err() {
            MapError::Parse { line, reason } => {
                assert_eq!(line, 5);
                assert!(reason.contains("TIMES"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_token_reports_the_line() {
        let text = "2 1\nTERRAIN\n1 1\nBOGUS\n";
        match parse_map(text).unwrap_err() {
            MapError::Parse { line, reason } => {
                assert_eq!(line, 4);
                assert!(reason.contains("BOGUS"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_terrain_cost_is_a_domain_error() {
        let text = "2 1\nTERRAIN\n1 0\n";
        match parse_map(text).unwrap_err() {
            MapError::Domain(DomainError::InvalidMap { reason }) => {
                assert!(reason.contains("below 1"));
            }
            other => panic!("Expected InvalidMap error, got {:?}", other),
        }
    }

    #[test]
    fn test_package_outside_grid_is_rejected() {
        let text = "2 2\nTERRAIN\n1 1\n1 1\nPACKAGES\n0 0 5 5\n";
        match parse_map(text).unwrap_err() {
            MapError::Domain(DomainError::InvalidMap { reason }) => {
                assert!(reason.contains("outside the grid"));
            }
            other => panic!("Expected InvalidMap error, got {:?}", other),
        }
    }

    #[test]
    fn test_terrain_row_width_mismatch_is_rejected() {
        let text = "3 2\nTERRAIN\n1 1 1\n1 1\n";
        match parse_map(text).unwrap_err() {
            MapError::Parse { line, reason } => {
                assert_eq!(line, 4);
                assert!(reason.contains("expected 3"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_repository_demo_map_parses() {
        let map = load_map("maps/small.map").unwrap();
        assert_eq!(map.world.width(), 10);
        assert_eq!(map.packages.len(), 2);
        assert!(map.world.is_blocked(pos(5, 5), 0).unwrap());
        assert!(map.world.is_blocked(pos(4, 6), 8).unwrap());
    }
}
