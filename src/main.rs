use peregrine_app::Config;
use std::error::Error;
use tracing::{error, info};

use peregrine_app::adapters::inbound::load_map;
use peregrine_app::adapters::outbound::render;
use peregrine_app::application::MissionService;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Peregrine delivery mission");

    // Load configuration, fall back to defaults when no config file is present
    let config = match Config::from_file("config.toml") {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            info!("No config.toml ({}), using defaults", e);
            Config::default()
        }
    };
    info!(
        "Planner: {}, fuel capacity: {}",
        config.mission.planner, config.mission.fuel_capacity
    );

    let map_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "maps/small.map".to_string());
    let map = match load_map(&map_path) {
        Ok(map) => map,
        Err(e) => {
            error!("Failed to load map {}: {}", map_path, e);
            return Err(Box::new(e));
        }
    };
    info!(
        "Map {}: {}x{}, {} packages, {} dynamic obstacles",
        map_path,
        map.world.width(),
        map.world.height(),
        map.packages.len(),
        map.world.dynamic_obstacles().len()
    );
    info!("Initial world:\n{}", render(&map.world, Some(map.start), &map.packages, 0));

    let service = MissionService::new(config);
    let report = service.run_mission(map);

    info!(
        "Mission {}: {}/{} delivered, cost {}, {} nodes expanded, {} replans, fuel left {}",
        report.mission_id,
        report.deliveries_completed,
        report.deliveries_total,
        report.metrics.total_path_cost,
        report.metrics.nodes_expanded,
        report.metrics.replanning_events,
        report.remaining_fuel
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
