//! Editor host capability seam
//!
//! Everything the core needs from the surrounding editor — window geometry,
//! buffer surfaces, selection state, deferred scheduling — goes through the
//! [`Host`] trait. The core computes what to do; the host does it.

pub mod layout;
#[cfg(any(test, feature = "mock-host"))]
pub mod mock;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use layout::WindowLayout;

/// Identifier for a host text/terminal buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Identifier for a host window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Identifier for a host tab page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u64);

/// Errors reported by host operations.
///
/// These indicate a harmless race with user-driven window or buffer closing;
/// the core logs and swallows them rather than propagating.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("window {0:?} is no longer valid")]
    StaleWindow(WindowId),
    #[error("buffer {0:?} is no longer valid")]
    StaleBuffer(BufferId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Point-in-time view of a source buffer the user is sending from.
#[derive(Debug, Clone, Default)]
pub struct BufferSnapshot {
    /// Concrete file path, if the buffer is backed by one
    pub path: Option<PathBuf>,
    /// Whether the buffer has unsaved edits
    pub modified: bool,
    /// Language tag for fenced blocks (editor filetype)
    pub filetype: Option<String>,
    /// Buffer content, one entry per line
    pub lines: Vec<String>,
}

/// A deferred task the host runs on its event loop after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Collapse a lingering visual selection in the pane window after a paste
    CollapseSelection { window: WindowId },
}

/// Capabilities the core requires from the embedding editor.
///
/// All window/buffer operations are assumed cheap and non-blocking; a stale
/// handle yields a [`HostError`] rather than panicking.
pub trait Host {
    /// Total editor columns
    fn columns(&self) -> u16;

    /// Total editor rows available for windows
    fn rows(&self) -> u16;

    /// The tab page the caller is currently on
    fn current_tab(&self) -> TabId;

    /// The buffer the caller is currently editing, if any
    fn current_buffer(&self) -> Option<BufferId>;

    /// The active visual selection as a 1-based inclusive line range
    fn visual_selection(&self) -> Option<(usize, usize)>;

    /// Snapshot a buffer's content and file status
    fn snapshot(&self, buffer: BufferId) -> Option<BufferSnapshot>;

    /// Create an empty buffer suitable for backing a terminal surface
    fn create_terminal_buffer(&mut self) -> Result<BufferId, HostError>;

    /// Open a window with the computed layout, showing the given buffer
    fn open_window(&mut self, buffer: BufferId, layout: &WindowLayout)
        -> Result<WindowId, HostError>;

    /// Whether a previously opened window still exists
    fn window_is_valid(&self, window: WindowId) -> bool;

    /// Move focus to the window
    fn focus_window(&mut self, window: WindowId) -> Result<(), HostError>;

    /// Close the window (the buffer and any attached process survive)
    fn close_window(&mut self, window: WindowId) -> Result<(), HostError>;

    /// Put the terminal surface into live-input mode so typed and pasted
    /// bytes reach the child process immediately
    fn enter_terminal_input(&mut self, window: WindowId) -> Result<(), HostError>;

    /// Whether a text-selection mode is active in the editor
    fn selection_active(&self) -> bool;

    /// Cancel selection mode and collapse visual marks to the cursor
    fn collapse_selection(&mut self);

    /// Install terminal-local keymaps on a pane buffer. Default no-op;
    /// gated by the `terminal_keymaps` config flag.
    fn install_terminal_keymaps(&mut self, _buffer: BufferId) {}

    /// Run a task on the host event loop after a delay (fire-and-forget)
    fn schedule(&mut self, delay: Duration, task: ScheduledTask);
}

/// Execute a previously scheduled task.
///
/// Called by the host integration when the timer fires. Checks validity at
/// fire time, so a task scheduled against a since-closed window degrades to
/// a no-op instead of touching a disposed surface.
pub fn run_scheduled<H: Host>(host: &mut H, task: ScheduledTask) {
    match task {
        ScheduledTask::CollapseSelection { window } => {
            if host.window_is_valid(window) && host.selection_active() {
                host.collapse_selection();
            }
        }
    }
}
