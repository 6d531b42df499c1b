pub mod command;
pub mod config;
pub mod defaults;
pub mod linter;
pub mod task;
pub mod types;

pub use command::CommandGate;
pub use config::{GateConfig, TaskGateSettings};
pub use task::TaskGate;
pub use types::*;
