/*!
 * Lifecycle Control
 * Signal delivery to a running child
 */

use crate::core::types::Pid;
use log::warn;

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::Pid as NixPid;

#[cfg(unix)]
fn send(pid: Pid, signal: Signal) -> bool {
    match kill(NixPid::from_raw(pid as i32), signal) {
        Ok(_) => true,
        Err(errno) => {
            warn!("Failed to send {} to PID {}: {}", signal, pid, errno);
            false
        }
    }
}

/// Ask the child to interrupt (SIGINT)
#[cfg(unix)]
pub(super) fn interrupt(pid: Pid) -> bool {
    send(pid, Signal::SIGINT)
}

/// Ask the child to terminate (SIGTERM)
#[cfg(unix)]
pub(super) fn terminate(pid: Pid) -> bool {
    send(pid, Signal::SIGTERM)
}

/// Stop scheduling the child (SIGSTOP)
#[cfg(unix)]
pub(super) fn pause(pid: Pid) -> bool {
    send(pid, Signal::SIGSTOP)
}

/// Resume scheduling the child (SIGCONT)
#[cfg(unix)]
pub(super) fn unpause(pid: Pid) -> bool {
    send(pid, Signal::SIGCONT)
}

/// Non-Unix stubs: report unsupported rather than fail silently
#[cfg(not(unix))]
fn unsupported(pid: Pid) -> bool {
    warn!(
        "Process control signals not supported on this platform (PID {})",
        pid
    );
    false
}

#[cfg(not(unix))]
pub(super) fn interrupt(pid: Pid) -> bool {
    unsupported(pid)
}

#[cfg(not(unix))]
pub(super) fn terminate(pid: Pid) -> bool {
    unsupported(pid)
}

#[cfg(not(unix))]
pub(super) fn pause(pid: Pid) -> bool {
    unsupported(pid)
}

#[cfg(not(unix))]
pub(super) fn unpause(pid: Pid) -> bool {
    unsupported(pid)
}
