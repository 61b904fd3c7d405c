pub mod grid;
pub mod obstacle;
pub mod types;

pub use grid::*;
pub use obstacle::*;
pub use types::*;
