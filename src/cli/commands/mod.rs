//! CLI command implementations.

mod batch;
mod config;
mod doctor;
mod research;
mod strategies;

pub use batch::run_batch;
pub use config::run_config;
pub use doctor::run_doctor;
pub use research::run_research;
pub use strategies::run_strategies;
