pub mod agent;
pub mod events;
pub mod package;

pub use agent::*;
pub use events::*;
pub use package::*;
