/*!
 * Task
 * The aggregate entity: configuration before launch, runtime state and
 * lifecycle control after
 */

use super::config::TaskConfig;
use super::types::{TaskError, TaskPhase, TaskResult, Termination, TerminationReason};
use super::{control, launch, observer};
use crate::core::types::{Pid, QualityOfService};
use crate::io::channel::{ChannelKind, TaskChannel};
use crate::io::pipe::{PipeReader, PipeWriter};
use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// One-shot termination callback. Taking it out of its slot can only
/// succeed once, which is what enforces at-most-one invocation.
pub type TerminationHandler = Box<dyn FnOnce(Task) + Send + 'static>;

/// State shared between the task handles and the monitor thread
pub(super) struct TaskShared {
    pub(super) state: Mutex<TaskState>,
    pub(super) exited: Condvar,
}

pub(super) struct TaskState {
    pub(super) config: TaskConfig,
    pub(super) phase: TaskPhase,
    pub(super) pid: Option<Pid>,
    pub(super) suspend_count: u32,
    pub(super) termination: Option<Termination>,
    pub(super) handler: Option<TerminationHandler>,
    pub(super) stdin: Option<PipeWriter>,
    pub(super) stdout: Option<PipeReader>,
    pub(super) stderr: Option<PipeReader>,
}

impl TaskState {
    fn running_pid(&self) -> Option<Pid> {
        match self.phase {
            TaskPhase::Running => self.pid,
            _ => None,
        }
    }
}

/// A configured, launchable child process and the handle to its
/// lifecycle.
///
/// Cloning is cheap; every clone refers to the same underlying task, so
/// control calls and waits may come from any thread. Dropping all
/// handles neither kills nor orphans a running child: the monitor
/// thread keeps the state alive until the child is reaped.
pub struct Task {
    shared: Arc<TaskShared>,
}

impl Task {
    /// Create an unlaunched task seeded with a snapshot of the calling
    /// process's environment and current directory.
    pub fn new() -> Self {
        Self::from_config(TaskConfig::new())
    }

    /// Create an unlaunched task from a prepared configuration
    pub fn from_config(config: TaskConfig) -> Self {
        Self {
            shared: Arc::new(TaskShared {
                state: Mutex::new(TaskState {
                    config,
                    phase: TaskPhase::Configured,
                    pid: None,
                    suspend_count: 0,
                    termination: None,
                    handler: None,
                    stdin: None,
                    stdout: None,
                    stderr: None,
                }),
                exited: Condvar::new(),
            }),
        }
    }

    pub(super) fn from_shared(shared: Arc<TaskShared>) -> Self {
        Self { shared }
    }

    fn configure<F>(&self, mutate: F) -> TaskResult<()>
    where
        F: FnOnce(&mut TaskConfig),
    {
        let mut state = self.shared.state.lock();
        if state.phase != TaskPhase::Configured {
            return Err(TaskError::AlreadyLaunched);
        }
        mutate(&mut state.config);
        Ok(())
    }

    /// Set the executable path. Pre-launch only, like every setter:
    /// once a launch has been attempted the configuration is immutable
    /// and setters return `AlreadyLaunched`.
    pub fn set_launch_path(&self, path: impl Into<String>) -> TaskResult<()> {
        let path = path.into();
        self.configure(move |config| config.launch_path = Some(path))
    }

    pub fn set_arguments(&self, arguments: Vec<String>) -> TaskResult<()> {
        self.configure(move |config| config.arguments = arguments)
    }

    pub fn set_environment(&self, environment: HashMap<String, String>) -> TaskResult<()> {
        self.configure(move |config| config.environment = environment)
    }

    pub fn set_working_directory(&self, dir: impl Into<PathBuf>) -> TaskResult<()> {
        let dir = dir.into();
        self.configure(move |config| config.working_directory = dir)
    }

    pub fn set_quality_of_service(&self, qos: QualityOfService) -> TaskResult<()> {
        self.configure(move |config| config.quality_of_service = qos)
    }

    pub fn set_standard_input(&self, channel: TaskChannel) -> TaskResult<()> {
        self.configure(move |config| config.standard_input = channel)
    }

    pub fn set_standard_output(&self, channel: TaskChannel) -> TaskResult<()> {
        self.configure(move |config| config.standard_output = channel)
    }

    pub fn set_standard_error(&self, channel: TaskChannel) -> TaskResult<()> {
        self.configure(move |config| config.standard_error = channel)
    }

    /// Register the termination callback. Invoked at most once, on the
    /// monitor thread, after the terminated state is visible.
    pub fn set_termination_handler<F>(&self, handler: F) -> TaskResult<()>
    where
        F: FnOnce(Task) + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        if state.phase != TaskPhase::Configured {
            return Err(TaskError::AlreadyLaunched);
        }
        state.handler = Some(Box::new(handler));
        Ok(())
    }

    pub fn launch_path(&self) -> Option<String> {
        self.shared.state.lock().config.launch_path.clone()
    }

    pub fn arguments(&self) -> Vec<String> {
        self.shared.state.lock().config.arguments.clone()
    }

    pub fn environment(&self) -> HashMap<String, String> {
        self.shared.state.lock().config.environment.clone()
    }

    pub fn working_directory(&self) -> PathBuf {
        self.shared.state.lock().config.working_directory.clone()
    }

    pub fn quality_of_service(&self) -> QualityOfService {
        self.shared.state.lock().config.quality_of_service
    }

    pub fn standard_input_kind(&self) -> ChannelKind {
        self.shared.state.lock().config.standard_input.kind()
    }

    pub fn standard_output_kind(&self) -> ChannelKind {
        self.shared.state.lock().config.standard_output.kind()
    }

    pub fn standard_error_kind(&self) -> ChannelKind {
        self.shared.state.lock().config.standard_error.kind()
    }

    /// Launch the configured child.
    ///
    /// Exactly one of two outcomes holds when this returns: the task is
    /// running (pid assigned, monitor thread watching) or an error is
    /// returned and no process exists. A second call on a launched or
    /// failed task returns `AlreadyLaunched`; racing calls serialize on
    /// the state lock so exactly one can win.
    pub fn launch(&self) -> TaskResult<()> {
        let mut state = self.shared.state.lock();
        if state.phase != TaskPhase::Configured {
            return Err(TaskError::AlreadyLaunched);
        }

        let outcome = match launch::launch(&state.config) {
            Ok(outcome) => outcome,
            Err(err) => {
                state.phase = TaskPhase::Failed;
                error!("Launch of {:?} failed: {}", state.config.launch_path, err);
                return Err(err);
            }
        };

        state.phase = TaskPhase::Running;
        state.pid = Some(outcome.pid);
        state.stdin = outcome.stdin;
        state.stdout = outcome.stdout;
        state.stderr = outcome.stderr;

        info!(
            "Launched '{}' (PID {})",
            state.config.launch_path.as_deref().unwrap_or(""),
            outcome.pid
        );

        let pid = outcome.pid;
        drop(state);

        observer::spawn_monitor(Arc::clone(&self.shared), pid);

        Ok(())
    }

    /// Send SIGINT. False when the task is not running or delivery
    /// fails; best-effort either way.
    pub fn interrupt(&self) -> bool {
        let state = self.shared.state.lock();
        match state.running_pid() {
            Some(pid) => control::interrupt(pid),
            None => false,
        }
    }

    /// Send SIGTERM. False when the task is not running or delivery
    /// fails; the child may ignore it.
    pub fn terminate(&self) -> bool {
        let state = self.shared.state.lock();
        match state.running_pid() {
            Some(pid) => control::terminate(pid),
            None => false,
        }
    }

    /// Suspend the child. Suspensions stack: the child stays stopped
    /// until every suspend has been matched by a resume.
    ///
    /// Suspension affects scheduling only, never I/O buffering: a
    /// suspended child holding a full output pipe can deadlock a caller
    /// that is simultaneously blocked writing its input pipe.
    pub fn suspend(&self) -> bool {
        let mut state = self.shared.state.lock();
        let pid = match state.running_pid() {
            Some(pid) => pid,
            None => return false,
        };

        // The stop signal only matters on the 0 -> 1 transition; if it
        // fails the count is left untouched.
        if state.suspend_count == 0 && !control::pause(pid) {
            return false;
        }

        state.suspend_count += 1;
        debug!("Suspended PID {} (depth {})", pid, state.suspend_count);
        true
    }

    /// Undo one suspend. The child is rescheduled only when the last
    /// outstanding suspend is resumed; resuming an unsuspended task
    /// returns false.
    pub fn resume(&self) -> bool {
        let mut state = self.shared.state.lock();
        let pid = match state.running_pid() {
            Some(pid) => pid,
            None => return false,
        };

        if state.suspend_count == 0 {
            return false;
        }
        if state.suspend_count == 1 && !control::unpause(pid) {
            return false;
        }

        state.suspend_count -= 1;
        debug!("Resumed PID {} (depth {})", pid, state.suspend_count);
        true
    }

    /// OS process identifier, assigned at launch
    pub fn process_identifier(&self) -> Option<Pid> {
        self.shared.state.lock().pid
    }

    /// True from a successful launch until the child has been reaped
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().phase == TaskPhase::Running
    }

    pub fn phase(&self) -> TaskPhase {
        self.shared.state.lock().phase
    }

    /// Outstanding suspend depth; 0 means the child is scheduled
    pub fn suspend_count(&self) -> u32 {
        self.shared.state.lock().suspend_count
    }

    /// Exit code or signal number, per the termination reason; `None`
    /// until the child has terminated.
    pub fn termination_status(&self) -> Option<i32> {
        self.shared.state.lock().termination.map(|t| t.status)
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.shared.state.lock().termination.map(|t| t.reason)
    }

    /// Full termination record, set exactly once with the running
    /// state transition
    pub fn termination(&self) -> Option<Termination> {
        self.shared.state.lock().termination
    }

    /// Block until the child terminates.
    ///
    /// Safe from any number of threads; all wake at termination and
    /// observe the same status. Returns immediately when nothing is
    /// running (before launch, after a failed launch, after
    /// termination).
    pub fn wait_until_exit(&self) {
        let mut state = self.shared.state.lock();
        while state.phase == TaskPhase::Running {
            self.shared.exited.wait(&mut state);
        }
    }

    /// Write end of the standard-input pipe, when that slot was `Pipe`.
    /// Yields the endpoint once; the caller then owns it and closing it
    /// (or dropping it) is what signals end-of-input to the child.
    pub fn take_stdin(&self) -> Option<PipeWriter> {
        self.shared.state.lock().stdin.take()
    }

    /// Read end of the standard-output pipe, when that slot was `Pipe`
    pub fn take_stdout(&self) -> Option<PipeReader> {
        self.shared.state.lock().stdout.take()
    }

    /// Read end of the standard-error pipe, when that slot was `Pipe`
    pub fn take_stderr(&self) -> Option<PipeReader> {
        self.shared.state.lock().stderr.take()
    }
}

// Not derivable: the state holds the boxed termination handler
impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Task")
            .field("phase", &state.phase)
            .field("pid", &state.pid)
            .field("suspend_count", &state.suspend_count)
            .field("termination", &state.termination)
            .finish()
    }
}

impl Clone for Task {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}
