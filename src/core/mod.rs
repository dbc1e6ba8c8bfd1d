//! Core session-lifecycle and payload-dispatch logic

pub mod config;
pub mod dispatch;
pub mod events;
pub mod holders;
pub mod payload;
pub mod session;
pub mod shutdown;

use crate::core::config::PaneConfig;
use crate::core::events::PaneEvent;
use crate::core::holders::HolderRegistry;
use crate::core::payload::LineRange;
use crate::host::{BufferId, Host};
use tokio::sync::mpsc;
use tracing::debug;

/// The pane context: frozen config plus the holder registry and the event
/// channel feeding PTY output back to the host.
///
/// Owned by the host integration and passed every host handle explicitly;
/// there is no process-wide state. All commands succeed or no-op silently —
/// inside an interactive editor, error dialogs are worse than a missed
/// paste.
pub struct AgentPane {
    config: PaneConfig,
    registry: HolderRegistry,
    events: mpsc::UnboundedSender<PaneEvent>,
}

impl AgentPane {
    /// Build a pane context from a resolved configuration.
    ///
    /// Returns the receiver the host integration drains on its event loop to
    /// feed PTY output into backing buffers.
    pub fn new(config: PaneConfig) -> (Self, mpsc::UnboundedReceiver<PaneEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                registry: HolderRegistry::new(),
                events: tx,
            },
            rx,
        )
    }

    /// The effective configuration
    pub fn config(&self) -> &PaneConfig {
        &self.config
    }

    /// Replace the configuration (re-resolution; last call wins)
    pub fn set_config(&mut self, config: PaneConfig) {
        self.config = config;
    }

    /// Open the pane, reusing or reattaching an existing session per the
    /// reuse policy, and focus it.
    pub fn open_or_focus<H: Host>(&mut self, host: &mut H) {
        session::ensure(&self.config, &mut self.registry, &self.events, host);
    }

    /// Close the pane window. The session stays alive and detached; the next
    /// open reattaches it instead of spawning a new process.
    pub fn close<H: Host>(&mut self, host: &mut H) {
        let tab = host.current_tab();
        let mut holder = self.registry.active_holder(self.config.reuse, tab);
        if let Some(window) = holder.window.take() {
            if host.window_is_valid(window) {
                if let Err(err) = host.close_window(window) {
                    debug!("could not close pane window: {err}");
                }
            }
        }
        self.registry.commit(self.config.reuse, tab, holder);
    }

    /// Send a 1-based inclusive line range from the current buffer
    pub fn send_range<H: Host>(&mut self, host: &mut H, start: usize, end: usize) {
        self.send_from_current(host, Some(LineRange::new(start, end)));
    }

    /// Send the whole current buffer
    pub fn send_buffer<H: Host>(&mut self, host: &mut H) {
        self.send_from_current(host, None);
    }

    /// Send the active visual selection, if any
    pub fn send_selection<H: Host>(&mut self, host: &mut H) {
        let Some((start, end)) = host.visual_selection() else {
            debug!("no visual selection to send");
            return;
        };
        self.send_from_current(host, Some(LineRange::new(start, end)));
    }

    /// Stop every tracked session and empty the registry
    pub fn shutdown_all<H: Host>(&mut self, host: &mut H) {
        shutdown::shutdown_all(&mut self.registry, host);
    }

    /// Host is exiting; terminate tracked processes if configured to
    pub fn on_host_exit<H: Host>(&mut self, host: &mut H) {
        if self.config.kill_on_exit {
            self.shutdown_all(host);
        }
    }

    /// A backing buffer was torn down; stop the one session that owned it
    pub fn on_buffer_closed<H: Host>(&mut self, host: &mut H, buffer: BufferId) {
        if let Some(mut holder) = self.registry.take_by_buffer(buffer) {
            shutdown::stop(&mut holder, host);
        }
    }

    fn send_from_current<H: Host>(&mut self, host: &mut H, range: Option<LineRange>) {
        let Some(buffer) = host.current_buffer() else {
            debug!("no current buffer to send from");
            return;
        };
        let Some(snapshot) = host.snapshot(buffer) else {
            debug!("current buffer vanished before snapshot");
            return;
        };
        let Some(payload) = payload::from_snapshot(
            &snapshot,
            range,
            &self.config.context_header,
            self.config.max_payload_bytes,
        ) else {
            // Empty selection: nothing to do, no send attempted
            return;
        };
        dispatch::send(&self.config, &mut self.registry, &self.events, host, &payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ReusePolicy;
    use crate::host::mock::MockHost;
    use crate::host::BufferSnapshot;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn cat_pane(reuse: ReusePolicy) -> (AgentPane, mpsc::UnboundedReceiver<PaneEvent>) {
        AgentPane::new(PaneConfig {
            cmd: "cat".to_string(),
            args: Vec::new(),
            reuse,
            bracketed_paste: false,
            context_header: "hdr".to_string(),
            ..PaneConfig::default()
        })
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    /// Drain PTY output until `needle` shows up (or a deadline passes) and
    /// return everything collected so far.
    fn output_until(rx: &mut mpsc::UnboundedReceiver<PaneEvent>, needle: &[u8]) -> Vec<u8> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut collected = Vec::new();
        while Instant::now() < deadline {
            while let Ok(event) = rx.try_recv() {
                if let PaneEvent::PtyOutput { data, .. } = event {
                    collected.extend_from_slice(&data);
                }
            }
            if contains(&collected, needle) {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        collected
    }

    fn output_containing(rx: &mut mpsc::UnboundedReceiver<PaneEvent>, needle: &[u8]) -> bool {
        contains(&output_until(rx, needle), needle)
    }

    #[test]
    fn test_send_range_dispatches_reference_for_clean_buffer() {
        let (mut pane, mut rx) = cat_pane(ReusePolicy::Global);
        let mut host = MockHost::new(120, 40);
        let source = host.add_source_buffer(BufferSnapshot {
            path: Some(PathBuf::from("/a/b.py")),
            modified: false,
            filetype: Some("python".to_string()),
            lines: vec!["a".into(), "b".into(), "c".into()],
        });
        host.set_current_buffer(source);

        pane.send_range(&mut host, 3, 3);
        assert!(output_containing(&mut rx, b"@/a/b.py:3"));

        pane.shutdown_all(&mut host);
    }

    #[test]
    fn test_send_range_dispatches_inline_for_modified_buffer() {
        let (mut pane, mut rx) = cat_pane(ReusePolicy::Global);
        let mut host = MockHost::new(120, 40);
        let source = host.add_source_buffer(BufferSnapshot {
            path: None,
            modified: true,
            filetype: Some("python".to_string()),
            lines: vec!["x=1".into(), "y=2".into()],
        });
        host.set_current_buffer(source);

        pane.send_range(&mut host, 1, 2);
        // The pty translates \n to \r\n on echo, so match line by line
        let output = output_until(&mut rx, b"y=2");
        assert!(contains(&output, b"hdr"));
        assert!(contains(&output, b"```python"));
        assert!(contains(&output, b"x=1"));
        assert!(contains(&output, b"y=2"));

        pane.shutdown_all(&mut host);
    }

    #[test]
    fn test_empty_selection_spawns_nothing() {
        let (mut pane, _rx) = cat_pane(ReusePolicy::Global);
        let mut host = MockHost::new(120, 40);
        let source = host.add_source_buffer(BufferSnapshot::default());
        host.set_current_buffer(source);

        pane.send_buffer(&mut host);

        // No session was created and no window opened
        assert!(pane.registry.is_empty());
        assert!(host.opened_windows == 0);
    }

    #[test]
    fn test_send_selection_uses_visual_range() {
        let (mut pane, mut rx) = cat_pane(ReusePolicy::Global);
        let mut host = MockHost::new(120, 40);
        let source = host.add_source_buffer(BufferSnapshot {
            path: Some(PathBuf::from("/s.rs")),
            modified: false,
            filetype: Some("rust".to_string()),
            lines: vec!["1".into(), "2".into(), "3".into(), "4".into()],
        });
        host.set_current_buffer(source);
        host.visual = Some((2, 4));

        pane.send_selection(&mut host);
        assert!(output_containing(&mut rx, b"@/s.rs:2-4"));

        pane.shutdown_all(&mut host);
    }

    #[test]
    fn test_close_detaches_but_keeps_session_alive() {
        let (mut pane, _rx) = cat_pane(ReusePolicy::Global);
        let mut host = MockHost::new(120, 40);

        pane.open_or_focus(&mut host);
        let holder = pane
            .registry
            .active_holder(ReusePolicy::Global, host.current_tab());
        let process = holder.process.clone().expect("process");
        let window = holder.window.expect("window");

        pane.close(&mut host);

        assert!(!host.window_is_valid(window));
        let after = pane
            .registry
            .active_holder(ReusePolicy::Global, host.current_tab());
        assert!(after.window.is_none());
        assert!(process.is_alive());

        pane.shutdown_all(&mut host);
    }

    #[test]
    fn test_on_buffer_closed_stops_matching_session_only() {
        let (mut pane, _rx) = cat_pane(ReusePolicy::Tab);
        let mut host = MockHost::new(120, 40);

        pane.open_or_focus(&mut host);
        let first = pane
            .registry
            .active_holder(ReusePolicy::Tab, host.current_tab());
        host.set_tab(crate::host::TabId(2));
        pane.open_or_focus(&mut host);

        let buffer = first.buffer.expect("buffer");
        pane.on_buffer_closed(&mut host, buffer);

        assert_eq!(pane.registry.len(), 1);

        pane.shutdown_all(&mut host);
        assert!(pane.registry.is_empty());
    }

    #[test]
    fn test_on_host_exit_respects_kill_on_exit() {
        let (mut pane, _rx) = cat_pane(ReusePolicy::Global);
        let mut host = MockHost::new(120, 40);

        pane.open_or_focus(&mut host);
        let holder = pane
            .registry
            .active_holder(ReusePolicy::Global, host.current_tab());
        let process = holder.process.clone().expect("process");

        pane.config.kill_on_exit = false;
        pane.on_host_exit(&mut host);
        assert_eq!(pane.registry.len(), 1);
        assert!(process.is_alive());

        pane.config.kill_on_exit = true;
        pane.on_host_exit(&mut host);
        assert!(pane.registry.is_empty());
    }
}
