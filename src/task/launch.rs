/*!
 * Launch Engine
 * Validates a configuration and turns it into a live child process
 */

use super::config::TaskConfig;
use super::types::{TaskError, TaskResult};
use crate::core::limits::{arg_space_limit, arg_space_required, env_space};
use crate::core::types::{Pid, QualityOfService};
use crate::io::channel::StreamRole;
use crate::io::pipe::{PipeReader, PipeWriter};
use log::{debug, warn};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a successful launch hands back to the task
pub(super) struct LaunchOutcome {
    pub pid: Pid,
    pub stdin: Option<PipeWriter>,
    pub stdout: Option<PipeReader>,
    pub stderr: Option<PipeReader>,
}

/// Validate the configuration in order, resolve the channel slots, and
/// spawn the child.
///
/// On any error no process exists and every descriptor created along
/// the way has been closed; the caller's own working directory is never
/// touched because the directory change happens in the child between
/// fork and exec.
pub(super) fn launch(config: &TaskConfig) -> TaskResult<LaunchOutcome> {
    let path = validate_launch_path(config)?;

    let required = arg_space_required(
        path.as_os_str().to_string_lossy().as_ref(),
        &config.arguments,
        env_space(&config.environment),
    );
    let limit = arg_space_limit();
    if required > limit {
        return Err(TaskError::TooManyArguments { required, limit });
    }

    validate_working_directory(&config.working_directory)?;

    let stdin = config.standard_input.resolve(StreamRole::Stdin)?;
    let stdout = config.standard_output.resolve(StreamRole::Stdout)?;
    let stderr = config.standard_error.resolve(StreamRole::Stderr)?;

    let mut cmd = Command::new(&path);
    cmd.args(&config.arguments);

    // The child gets exactly the snapshotted environment, nothing inherited
    cmd.env_clear();
    cmd.envs(&config.environment);

    cmd.current_dir(&config.working_directory);

    cmd.stdin(stdin.child).stdout(stdout.child).stderr(stderr.child);

    let child = cmd.spawn().map_err(|e| classify_spawn_error(config, e))?;
    let pid = child.id();

    // Dropping the handle neither kills nor reaps the child; the
    // termination observer owns the wait.
    drop(child);

    apply_quality_of_service(pid, config.quality_of_service);

    debug!("Spawned '{}' as PID {}", path.display(), pid);

    Ok(LaunchOutcome {
        pid,
        stdin: stdin.parent.map(PipeWriter::from_fd),
        stdout: stdout.parent.map(PipeReader::from_fd),
        stderr: stderr.parent.map(PipeReader::from_fd),
    })
}

/// The launch path must be set, non-empty, and name an executable
/// regular file. Relative paths resolve against the configured working
/// directory, matching where the child's exec will resolve them.
fn validate_launch_path(config: &TaskConfig) -> TaskResult<PathBuf> {
    let raw = match config.launch_path {
        Some(ref p) if !p.is_empty() => p,
        _ => {
            return Err(TaskError::InvalidLaunchPath {
                path: String::new(),
                errno: None,
            })
        }
    };

    let path = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        config.working_directory.join(raw)
    };

    let meta = fs::metadata(&path).map_err(|e| TaskError::InvalidLaunchPath {
        path: raw.clone(),
        errno: e.raw_os_error(),
    })?;

    if !meta.is_file() || meta.permissions().mode() & 0o111 == 0 {
        return Err(TaskError::InvalidLaunchPath {
            path: raw.clone(),
            errno: Some(libc::EACCES),
        });
    }

    Ok(path)
}

/// The working directory must exist and be a directory at validation
/// time; the race against its later removal is handled by
/// `classify_spawn_error`.
fn validate_working_directory(dir: &Path) -> TaskResult<()> {
    let meta = fs::metadata(dir).map_err(|e| TaskError::InvalidWorkingDirectory {
        dir: dir.display().to_string(),
        errno: e.raw_os_error(),
    })?;

    if !meta.is_dir() {
        return Err(TaskError::InvalidWorkingDirectory {
            dir: dir.display().to_string(),
            errno: Some(libc::ENOTDIR),
        });
    }

    Ok(())
}

/// A directory that validated moments ago can vanish before the child's
/// chdir runs; a re-check tells the caller which step actually failed.
fn classify_spawn_error(config: &TaskConfig, err: io::Error) -> TaskError {
    if fs::metadata(&config.working_directory).is_err() {
        return TaskError::ChangeDirectoryFailed {
            dir: config.working_directory.display().to_string(),
            errno: err.raw_os_error(),
        };
    }

    TaskError::SpawnFailed {
        reason: err.to_string(),
        errno: err.raw_os_error(),
    }
}

/// Apply the scheduling hint to the spawned child. Never fails the
/// launch: raising priority needs privileges most callers lack.
fn apply_quality_of_service(pid: Pid, qos: QualityOfService) {
    let nice = qos.nice_value();
    if nice == 0 {
        return;
    }

    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, pid as libc::id_t, nice) };
    if rc == 0 {
        debug!("Set nice {} on PID {}", nice, pid);
    } else {
        warn!(
            "Failed to set nice {} on PID {}: {}",
            nice,
            pid,
            io::Error::last_os_error()
        );
    }
}
