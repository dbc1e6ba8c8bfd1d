//! agentpane
//!
//! Embeds an agent CLI in a PTY-backed terminal pane inside an editor host
//! and forwards editor-selected text to it as formatted context.
//!
//! # Features
//! - Spawns the agent CLI in a PTY attached to a host-provided terminal buffer
//! - Reuses one session per configurable scope (global, per-tab, or never)
//! - Reattaches a live session to a fresh window when the user closes the pane
//! - Sends selections as `@path[:lines]` references or fenced inline blocks
//! - Wraps dispatched text in bracketed-paste framing so the agent receives
//!   it as one atomic paste
//! - Tears every tracked process down on host exit or buffer teardown
//!
//! The editor's window geometry, keymaps, and terminal rendering stay on the
//! host side of the [`host::Host`] trait; this crate never talks to an editor
//! API directly.

pub mod core;
pub mod host;
pub mod pty;

pub use crate::core::config::{PaneConfig, PaneSize, ReusePolicy, SplitKind, SplitSide, VsplitSide};
pub use crate::core::events::PaneEvent;
pub use crate::core::holders::{Holder, HolderId, HolderRegistry};
pub use crate::core::payload::LineRange;
pub use crate::core::AgentPane;
pub use crate::host::{
    run_scheduled, BufferId, BufferSnapshot, Host, HostError, ScheduledTask, TabId, WindowId,
    WindowLayout,
};
pub use crate::pty::process::PtyProcess;
