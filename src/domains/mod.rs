pub mod delivery;
pub mod grid_world;
pub mod mission;
pub mod planning;
pub mod replanning;
