//! Payload dispatch
//!
//! Delivers a payload to the active session's process, ensuring a session
//! exists first. When bracketed-paste framing is enabled the payload is
//! wrapped so the agent treats it as one atomic paste instead of a stream of
//! keystrokes. A short deferred cleanup collapses any lingering selection
//! highlight after the paste; it is fire-and-forget and never blocks or
//! fails the send.

use crate::core::config::PaneConfig;
use crate::core::events::PaneEvent;
use crate::core::holders::HolderRegistry;
use crate::core::session;
use crate::host::{Host, ScheduledTask};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Bracketed-paste open sequence
pub const PASTE_BEGIN: &str = "\x1b[200~";

/// Bracketed-paste close sequence
pub const PASTE_END: &str = "\x1b[201~";

/// Delay before collapsing the selection, tuned to let paste mode settle
pub const SELECTION_SETTLE: Duration = Duration::from_millis(50);

/// Send a payload to the active session, creating one on demand.
///
/// If no process handle exists even after ensure, the send is silently
/// dropped; there is nothing to send to and interrupting the user's editing
/// flow over it would be worse than the missed paste.
pub fn send<H: Host>(
    config: &PaneConfig,
    registry: &mut HolderRegistry,
    events: &mpsc::UnboundedSender<PaneEvent>,
    host: &mut H,
    payload: &str,
) {
    let holder = session::ensure(config, registry, events, host);
    let Some(process) = &holder.process else {
        debug!("no active process; dropping payload");
        return;
    };

    let mut text = payload.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let framed = if config.bracketed_paste {
        format!("{PASTE_BEGIN}{text}{PASTE_END}")
    } else {
        text
    };

    if let Err(err) = process.write_bytes(framed.as_bytes()) {
        warn!("failed to write payload to agent: {err}");
        return;
    }

    if let Some(window) = holder.window {
        host.schedule(SELECTION_SETTLE, ScheduledTask::CollapseSelection { window });
    }
}
