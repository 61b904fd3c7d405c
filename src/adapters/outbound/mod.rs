pub mod grid_render;

pub use grid_render::*;
