/*!
 * Pipe Endpoints
 * Parent-side ends of the anonymous pipes connecting a child's
 * standard streams to the caller
 */

use crate::io::channel::StreamRole;
use crate::task::types::{TaskError, TaskResult};
use log::debug;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::OwnedFd;

/// Create an anonymous pipe with both ends close-on-exec.
///
/// Returned as (read end, write end). The spawn machinery clears the
/// flag on whichever end it dups onto the child's fd 0/1/2; the flag
/// keeps the other end out of the child entirely.
pub(crate) fn pipe_pair(role: StreamRole) -> TaskResult<(OwnedFd, OwnedFd)> {
    let pair = pipe2(OFlag::O_CLOEXEC).map_err(|errno| TaskError::FileActionFailure {
        stream: role,
        reason: errno.desc().to_string(),
        errno: Some(errno as i32),
    })?;
    debug!("Created pipe pair for {}", role);
    Ok(pair)
}

/// Read end of a pipe carrying a child's standard output or error.
///
/// Owned by the caller once taken from the task; dropping it closes the
/// descriptor and a child still writing sees EPIPE/SIGPIPE.
#[derive(Debug)]
pub struct PipeReader {
    inner: File,
}

impl PipeReader {
    pub(crate) fn from_fd(fd: OwnedFd) -> Self {
        Self {
            inner: File::from(fd),
        }
    }

    /// Consume the reader, yielding the raw descriptor
    pub fn into_owned_fd(self) -> OwnedFd {
        self.inner.into()
    }

    /// Drain the pipe until the child closes its end
    pub fn drain(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.inner.read_to_end(&mut data)?;
        Ok(data)
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Write end of a pipe feeding a child's standard input.
///
/// Dropping it closes the descriptor, which is how the child observes
/// end-of-input.
#[derive(Debug)]
pub struct PipeWriter {
    inner: File,
}

impl PipeWriter {
    pub(crate) fn from_fd(fd: OwnedFd) -> Self {
        Self {
            inner: File::from(fd),
        }
    }

    /// Consume the writer, yielding the raw descriptor
    pub fn into_owned_fd(self) -> OwnedFd {
        self.inner.into()
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
