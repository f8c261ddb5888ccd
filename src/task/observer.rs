/*!
 * Termination Observer
 *
 * A dedicated monitor thread per launched child blocks in the OS
 * reaper, records the final status atomically with the running state
 * transition, wakes every waiter, and fires the registered handler
 * exactly once.
 */

use super::task::{Task, TaskShared, TerminationHandler};
use super::types::{TaskPhase, Termination, TerminationReason};
use crate::core::types::Pid;
use log::{error, info, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid as NixPid;
use std::sync::Arc;
use std::thread;

#[cfg(any(target_os = "linux", target_os = "android"))]
use nix::sys::wait::{waitid, Id, WaitPidFlag};

/// Start the monitor thread for a freshly launched child
pub(super) fn spawn_monitor(shared: Arc<TaskShared>, pid: Pid) {
    let builder = thread::Builder::new().name(format!("task-monitor-{}", pid));
    if let Err(e) = builder.spawn(move || monitor(shared, pid)) {
        error!("Failed to start monitor thread for PID {}: {}", pid, e);
    }
}

fn monitor(shared: Arc<TaskShared>, pid: Pid) {
    let handler = observe(&shared, pid);

    shared.exited.notify_all();

    if let Some(handler) = handler {
        handler(Task::from_shared(shared));
    }
}

/// Block until the child is gone, record the outcome, reap, and take
/// the handler out of the state.
///
/// The first wait observes the exit without reaping (`WNOWAIT`), so the
/// OS cannot recycle the pid while a control call may still hold it.
/// The reap itself happens inside the state critical section: by the
/// time the lock drops, the phase is `Terminated` and no control call
/// will ever signal the now-reusable pid.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn observe(shared: &Arc<TaskShared>, pid: Pid) -> Option<TerminationHandler> {
    let nix_pid = NixPid::from_raw(pid as i32);

    // An embedder's non-SA_RESTART signal handler can interrupt the wait
    let peeked = loop {
        match waitid(Id::Pid(nix_pid), WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT) {
            Err(Errno::EINTR) => continue,
            other => break other,
        }
    };
    let termination = match peeked {
        Ok(status) => classify(pid, status),
        Err(errno) => {
            // Reaching here means someone else reaped our child; the
            // real status is unknowable at this point.
            error!("Wait for PID {} failed: {}", pid, errno);
            Termination {
                status: -1,
                reason: TerminationReason::Exited,
            }
        }
    };

    let mut state = shared.state.lock();
    record(&mut state, termination, pid);
    loop {
        match waitpid(nix_pid, None) {
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                warn!("Failed to reap PID {}: {}", pid, errno);
                break;
            }
            Ok(_) => break,
        }
    }
    state.handler.take()
}

/// Single-phase fallback where `waitid`/`WNOWAIT` is unavailable: the
/// pid is reusable the moment `waitpid` returns, so the state
/// transition follows immediately and the lock discipline alone guards
/// control calls.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn observe(shared: &Arc<TaskShared>, pid: Pid) -> Option<TerminationHandler> {
    let nix_pid = NixPid::from_raw(pid as i32);

    // An embedder's non-SA_RESTART signal handler can interrupt the wait
    let waited = loop {
        match waitpid(nix_pid, None) {
            Err(Errno::EINTR) => continue,
            other => break other,
        }
    };
    let termination = match waited {
        Ok(status) => classify(pid, status),
        Err(errno) => {
            error!("Wait for PID {} failed: {}", pid, errno);
            Termination {
                status: -1,
                reason: TerminationReason::Exited,
            }
        }
    };

    let mut state = shared.state.lock();
    record(&mut state, termination, pid);
    state.handler.take()
}

fn record(state: &mut super::task::TaskState, termination: Termination, pid: Pid) {
    state.termination = Some(termination);
    state.phase = TaskPhase::Terminated;
    state.suspend_count = 0;

    info!(
        "Task PID {} terminated: {:?} (status {})",
        pid, termination.reason, termination.status
    );
}

fn classify(pid: Pid, status: WaitStatus) -> Termination {
    match status {
        WaitStatus::Exited(_, code) => Termination {
            status: code,
            reason: TerminationReason::Exited,
        },
        WaitStatus::Signaled(_, signal, _) => Termination {
            status: signal as i32,
            reason: TerminationReason::Signaled,
        },
        other => {
            // Waiting with WEXITED only cannot report stops or continues
            warn!("Unexpected wait status for PID {}: {:?}", pid, other);
            Termination {
                status: -1,
                reason: TerminationReason::Exited,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn test_classify_exit() {
        let termination = classify(42, WaitStatus::Exited(NixPid::from_raw(42), 3));
        assert_eq!(termination.reason, TerminationReason::Exited);
        assert_eq!(termination.status, 3);
    }

    #[test]
    fn test_classify_signal() {
        let termination = classify(
            42,
            WaitStatus::Signaled(NixPid::from_raw(42), Signal::SIGTERM, false),
        );
        assert_eq!(termination.reason, TerminationReason::Signaled);
        assert_eq!(termination.status, Signal::SIGTERM as i32);
    }
}
