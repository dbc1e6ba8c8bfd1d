//! Session lifecycle
//!
//! `ensure` is the create-or-reuse-or-reattach state machine: a live,
//! windowed session is just refocused; a live session whose window the user
//! closed gets a fresh window over the same backing buffer; anything else
//! gets a new buffer, window, and child process. Every path ends with the
//! pane focused and the terminal surface in live-input mode.

use crate::core::config::PaneConfig;
use crate::core::events::PaneEvent;
use crate::core::holders::{Holder, HolderRegistry};
use crate::host::layout::{compute_layout, WindowLayout};
use crate::host::{Host, WindowId};
use crate::pty::process::PtyProcess;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Produce a ready, focused, input-accepting session for the active scope.
///
/// Failures (stale handles, spawn errors) degrade to a holder without a
/// process; the next invocation retries fresh. Nothing here surfaces an
/// error to the caller.
pub fn ensure<H: Host>(
    config: &PaneConfig,
    registry: &mut HolderRegistry,
    events: &mpsc::UnboundedSender<PaneEvent>,
    host: &mut H,
) -> Holder {
    let tab = host.current_tab();
    let mut holder = registry.active_holder(config.reuse, tab);

    if holder.is_alive() {
        // Still running and still visible: just refocus.
        if let Some(window) = holder.window.filter(|w| host.window_is_valid(*w)) {
            focus_input(host, window);
            return holder;
        }

        // Detached but alive: reattach the backing buffer to a new window.
        if let Some(buffer) = holder.buffer {
            let layout = compute_layout(config, host.columns(), host.rows());
            match host.open_window(buffer, &layout) {
                Ok(window) => {
                    holder.window = Some(window);
                    resize_to_layout(&holder, &layout, host);
                    registry.commit(config.reuse, tab, holder.clone());
                    focus_input(host, window);
                }
                Err(err) => warn!("failed to reopen pane window: {err}"),
            }
            return holder;
        }
    }

    // No process, or it died: start over.
    holder.clear_session();
    holder.window = None;

    let layout = compute_layout(config, host.columns(), host.rows());
    let buffer = match host.create_terminal_buffer() {
        Ok(buffer) => buffer,
        Err(err) => {
            warn!("failed to create pane buffer: {err}");
            registry.commit(config.reuse, tab, holder.clone());
            return holder;
        }
    };
    let window = match host.open_window(buffer, &layout) {
        Ok(window) => window,
        Err(err) => {
            warn!("failed to open pane window: {err}");
            registry.commit(config.reuse, tab, holder.clone());
            return holder;
        }
    };

    let (rows, cols) = layout.terminal_size(host.columns(), host.rows());
    match PtyProcess::spawn(config, rows, cols, buffer, events.clone()) {
        Ok(process) => {
            holder.process = Some(process);
            holder.buffer = Some(buffer);
            holder.window = Some(window);
            if config.terminal_keymaps {
                host.install_terminal_keymaps(buffer);
            }
            registry.commit(config.reuse, tab, holder.clone());
            focus_input(host, window);
        }
        Err(err) => {
            warn!("failed to spawn {}: {err:#}", config.cmd);
            // Leave no valid process handle; the next liveness check
            // reports not-alive and a fresh attempt is made.
            if let Err(err) = host.close_window(window) {
                debug!("could not close window after spawn failure: {err}");
            }
            registry.commit(config.reuse, tab, holder.clone());
        }
    }

    holder
}

fn focus_input<H: Host>(host: &mut H, window: WindowId) {
    if let Err(err) = host.focus_window(window) {
        debug!("focus failed: {err}");
        return;
    }
    if let Err(err) = host.enter_terminal_input(window) {
        debug!("could not enter terminal input mode: {err}");
    }
}

fn resize_to_layout<H: Host>(holder: &Holder, layout: &WindowLayout, host: &H) {
    if let Some(process) = &holder.process {
        let (rows, cols) = layout.terminal_size(host.columns(), host.rows());
        if let Err(err) = process.resize(rows, cols) {
            debug!("PTY resize failed: {err}");
        }
    }
}
