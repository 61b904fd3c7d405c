pub mod metrics;
pub mod path;
pub mod planners;
pub mod problem;

pub use metrics::*;
pub use path::*;
pub use planners::*;
pub use problem::*;
