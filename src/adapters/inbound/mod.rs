pub mod map_loader;

pub use map_loader::*;
