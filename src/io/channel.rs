/*!
 * Channel Slots
 * Tagged standard-stream slots resolved into concrete descriptors at launch
 */

use crate::io::pipe::pipe_pair;
use crate::task::types::{TaskError, TaskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::os::fd::OwnedFd;
use std::process::Stdio;

/// Which standard stream a slot or failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRole {
    Stdin,
    Stdout,
    Stderr,
}

impl StreamRole {
    /// True for the stream the child reads rather than writes
    pub fn is_input(&self) -> bool {
        matches!(self, StreamRole::Stdin)
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamRole::Stdin => "stdin",
            StreamRole::Stdout => "stdout",
            StreamRole::Stderr => "stderr",
        };
        write!(f, "{}", name)
    }
}

/// Shape of a channel slot, without the descriptor itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Inherit,
    Handle,
    Pipe,
}

/// A standard-stream slot of a not-yet-launched task.
///
/// The slot owns any descriptor moved into it; the child only ever
/// receives duplicates, so close happens exactly once, on drop.
#[derive(Debug)]
pub enum TaskChannel {
    /// Child shares the caller's descriptor for this stream
    Inherit,
    /// Child receives a duplicate of this descriptor
    Handle(OwnedFd),
    /// A fresh pipe connects the child to the caller
    Pipe,
}

impl TaskChannel {
    /// Tag for the slot's current shape
    pub fn kind(&self) -> ChannelKind {
        match self {
            TaskChannel::Inherit => ChannelKind::Inherit,
            TaskChannel::Handle(_) => ChannelKind::Handle,
            TaskChannel::Pipe => ChannelKind::Pipe,
        }
    }

    /// Resolve the slot into what the child inherits on this stream and,
    /// for pipe slots, the end the caller keeps.
    ///
    /// Descriptor duplication and pipe creation failures surface as
    /// `FileActionFailure`; nothing is spawned and already-created ends
    /// close on drop.
    pub(crate) fn resolve(&self, role: StreamRole) -> TaskResult<ResolvedChannel> {
        match self {
            TaskChannel::Inherit => Ok(ResolvedChannel {
                child: Stdio::inherit(),
                parent: None,
            }),
            TaskChannel::Handle(fd) => {
                let dup = fd.try_clone().map_err(|e| TaskError::FileActionFailure {
                    stream: role,
                    reason: e.to_string(),
                    errno: e.raw_os_error(),
                })?;
                Ok(ResolvedChannel {
                    child: Stdio::from(dup),
                    parent: None,
                })
            }
            TaskChannel::Pipe => {
                let (read_end, write_end) = pipe_pair(role)?;
                // The child reads its stdin and writes its stdout/stderr;
                // the caller keeps the opposite end.
                if role.is_input() {
                    Ok(ResolvedChannel {
                        child: Stdio::from(read_end),
                        parent: Some(write_end),
                    })
                } else {
                    Ok(ResolvedChannel {
                        child: Stdio::from(write_end),
                        parent: Some(read_end),
                    })
                }
            }
        }
    }
}

impl Default for TaskChannel {
    fn default() -> Self {
        TaskChannel::Inherit
    }
}

impl From<File> for TaskChannel {
    fn from(file: File) -> Self {
        TaskChannel::Handle(file.into())
    }
}

impl From<OwnedFd> for TaskChannel {
    fn from(fd: OwnedFd) -> Self {
        TaskChannel::Handle(fd)
    }
}

/// Outcome of resolving one slot: the child-side `Stdio` plus the
/// caller-retained pipe end, present only for `Pipe` slots.
pub(crate) struct ResolvedChannel {
    pub(crate) child: Stdio,
    pub(crate) parent: Option<OwnedFd>,
}
