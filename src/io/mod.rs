/*!
 * I/O Module
 * Standard-stream slots and the pipe endpoints behind them
 */

pub mod channel;
pub mod pipe;

// Re-export for convenience
pub use channel::{ChannelKind, StreamRole, TaskChannel};
pub use pipe::{PipeReader, PipeWriter};
