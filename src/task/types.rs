/*!
 * Task Types
 * Error taxonomy, lifecycle phases, and termination records
 */

use crate::io::channel::StreamRole;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task operation result
pub type TaskResult<T> = Result<T, TaskError>;

/// Task errors.
///
/// All launch-time failures are detected before any process exists and
/// carry the underlying OS error number where one applies. The numeric
/// codes are stable and part of the reporting contract.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TaskError {
    #[error("Spawn failed: {reason}")]
    SpawnFailed { reason: String, errno: Option<i32> },

    #[error("Invalid launch path: {path:?}")]
    InvalidLaunchPath { path: String, errno: Option<i32> },

    #[error("Invalid working directory: {dir}")]
    InvalidWorkingDirectory { dir: String, errno: Option<i32> },

    #[error("Arguments and environment require {required} bytes, limit is {limit}")]
    TooManyArguments { required: usize, limit: usize },

    #[error("File action failed on {stream}: {reason}")]
    FileActionFailure {
        stream: StreamRole,
        reason: String,
        errno: Option<i32>,
    },

    #[error("Change directory failed: {dir}")]
    ChangeDirectoryFailed { dir: String, errno: Option<i32> },

    #[error("Task already launched")]
    AlreadyLaunched,
}

impl TaskError {
    /// Stable numeric code for the error class
    pub fn code(&self) -> u32 {
        match self {
            TaskError::SpawnFailed { .. } => 1,
            TaskError::InvalidLaunchPath { .. } => 2,
            TaskError::InvalidWorkingDirectory { .. } => 3,
            TaskError::TooManyArguments { .. } => 4,
            TaskError::FileActionFailure { .. } => 5,
            TaskError::ChangeDirectoryFailed { .. } => 6,
            TaskError::AlreadyLaunched => 7,
        }
    }

    /// Underlying OS error number, when the failure came from the OS
    pub fn os_error(&self) -> Option<i32> {
        match self {
            TaskError::SpawnFailed { errno, .. }
            | TaskError::InvalidLaunchPath { errno, .. }
            | TaskError::InvalidWorkingDirectory { errno, .. }
            | TaskError::FileActionFailure { errno, .. }
            | TaskError::ChangeDirectoryFailed { errno, .. } => *errno,
            TaskError::TooManyArguments { .. } | TaskError::AlreadyLaunched => None,
        }
    }
}

/// Lifecycle phase of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    /// Not yet launched; configuration is mutable
    Configured,
    /// Launch failed; configuration stays readable, relaunch is refused
    Failed,
    /// Child is alive (scheduled or suspended)
    Running,
    /// Child has terminated and been reaped
    Terminated,
}

/// Why a child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Exited on its own; the status is its exit code
    Exited,
    /// Killed by a signal; the status is the signal number
    Signaled,
}

/// Final state of a terminated child, recorded exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    /// Exit code or signal number, per `reason`
    pub status: i32,
    pub reason: TerminationReason,
}
