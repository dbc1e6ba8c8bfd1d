//! Session teardown
//!
//! All best-effort: interrupt, then kill, then close the window if it still
//! exists. Holder fields are cleared regardless of whether termination
//! succeeded, so a stale handle never survives a stop.

use crate::core::holders::{Holder, HolderRegistry};
use crate::host::Host;
use tracing::{debug, info};

/// Stop one session: interrupt, kill, close its window, clear the holder.
pub fn stop<H: Host>(holder: &mut Holder, host: &mut H) {
    if let Some(process) = holder.process.take() {
        if let Err(err) = process.interrupt() {
            debug!("interrupt failed: {err}");
        }
        process.kill();
    }
    holder.buffer = None;

    if let Some(window) = holder.window.take() {
        if host.window_is_valid(window) {
            if let Err(err) = host.close_window(window) {
                debug!("could not close pane window: {err}");
            }
        }
    }
}

/// Stop every tracked session and clear the registry entirely.
pub fn shutdown_all<H: Host>(registry: &mut HolderRegistry, host: &mut H) {
    let holders = registry.drain();
    if !holders.is_empty() {
        info!("shutting down {} pane session(s)", holders.len());
    }
    for mut holder in holders {
        stop(&mut holder, host);
    }
}
