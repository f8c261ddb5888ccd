/*!
 * Task Module
 * Child-process lifecycle: configure, launch, control, observe
 */

mod control;
mod launch;
mod observer;

pub mod config;
pub mod task;
pub mod types;

// Re-export for convenience
pub use config::TaskConfig;
pub use task::{Task, TerminationHandler};
pub use types::{TaskError, TaskPhase, TaskResult, Termination, TerminationReason};
