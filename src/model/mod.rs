pub mod config;
pub mod task;
pub mod workspace;

pub use config::*;
pub use task::*;
pub use workspace::*;
