//! Run orchestration: configuration, shared state, the worker pool and the
//! controller that ties them together.
mod config;
mod controller;
mod scheduler;
mod state;


pub use config::RunConfig;
pub use controller::{CompletedRun, RunController, RunHandle};
pub use scheduler::ConcurrencyScheduler;
pub use state::RunState;
