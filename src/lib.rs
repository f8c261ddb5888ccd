/*!
 * Taskling Library
 * Child-process lifecycle management: configure, launch, control,
 * and observe termination
 */

pub mod convenience;
pub mod core;
pub mod io;
pub mod task;

// Re-exports
pub use crate::core::types::{Pid, QualityOfService};
pub use convenience::{execute, execute_collecting, launched_task, task_with_command};
pub use io::{ChannelKind, PipeReader, PipeWriter, StreamRole, TaskChannel};
pub use task::{
    Task, TaskConfig, TaskError, TaskPhase, TaskResult, Termination, TerminationHandler,
    TerminationReason,
};
