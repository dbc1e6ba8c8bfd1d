//! Pane event definitions
//!
//! PTY reader threads forward output and exit notices over an unbounded
//! channel; the host integration drains it on its event loop and feeds the
//! backing buffer. The core itself never blocks on the child process.

use crate::host::BufferId;

/// Events emitted by a pane's PTY reader thread
#[derive(Debug, Clone)]
pub enum PaneEvent {
    /// Raw child-process output destined for a backing buffer
    PtyOutput { buffer: BufferId, data: Vec<u8> },

    /// The child process exited
    PtyExited { buffer: BufferId, code: Option<i32> },
}
