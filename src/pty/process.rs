//! PTY-backed agent process
//!
//! Spawns the agent CLI in a pseudo-terminal, pumps its output to the pane
//! event channel from a background reader thread, and answers liveness
//! queries with a zero-timeout poll. The child's lifetime is tied to explicit
//! stop or host exit, never to the window showing its output.

use crate::core::config::PaneConfig;
use crate::core::events::PaneEvent;
use crate::host::BufferId;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Interrupt byte sent on stop (Ctrl-C)
pub const INTERRUPT: u8 = 0x03;

type SharedChild = Arc<Mutex<Box<dyn Child + Send + Sync>>>;

/// A running agent process attached to a pseudo-terminal
pub struct PtyProcess {
    master: Mutex<Box<dyn MasterPty + Send>>,
    writer: Mutex<Box<dyn Write + Send>>,
    child: SharedChild,
}

impl std::fmt::Debug for PtyProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyProcess").finish_non_exhaustive()
    }
}

impl PtyProcess {
    /// Spawn the configured command in a fresh PTY.
    ///
    /// Output is forwarded to `events` tagged with `buffer`, the backing
    /// buffer the host renders it into. Working directory is the host's
    /// current working directory.
    pub fn spawn(
        config: &PaneConfig,
        rows: u16,
        cols: u16,
        buffer: BufferId,
        events: mpsc::UnboundedSender<PaneEvent>,
    ) -> Result<Arc<Self>> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to create PTY")?;

        let mut cmd = CommandBuilder::new(&config.cmd);
        for arg in &config.args {
            cmd.arg(arg);
        }
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");

        info!("Starting agent CLI: {} {:?}", config.cmd, config.args);

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn {}", config.cmd))?;

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;
        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        let child: SharedChild = Arc::new(Mutex::new(child));
        let process = Arc::new(Self {
            master: Mutex::new(pair.master),
            writer: Mutex::new(writer),
            child: Arc::clone(&child),
        });

        start_reader_thread(reader, child, buffer, events);

        Ok(process)
    }

    /// Whether the child is still running.
    ///
    /// Zero-timeout non-blocking poll; any error querying process state
    /// reports not-alive (fails closed).
    pub fn is_alive(&self) -> bool {
        match self.child.lock().try_wait() {
            Ok(None) => true,
            Ok(Some(_)) | Err(_) => false,
        }
    }

    /// Write bytes to the child's input stream
    pub fn write_bytes(&self, data: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(data)?;
        writer.flush()?;
        Ok(())
    }

    /// Send a single interrupt byte (Ctrl-C)
    pub fn interrupt(&self) -> Result<()> {
        self.write_bytes(&[INTERRUPT])
    }

    /// Forcefully terminate the child. Best-effort; failures are logged.
    pub fn kill(&self) {
        if let Err(err) = self.child.lock().kill() {
            debug!("kill failed (process likely already exited): {err}");
        }
    }

    /// Resize the PTY to match a new window geometry
    pub fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        self.master
            .lock()
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to resize PTY")?;
        Ok(())
    }
}

/// Pump PTY output to the event channel until EOF, then report the exit code.
fn start_reader_thread(
    mut reader: Box<dyn Read + Send>,
    child: SharedChild,
    buffer: BufferId,
    events: mpsc::UnboundedSender<PaneEvent>,
) {
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    debug!("PTY EOF");
                    break;
                }
                Ok(n) => {
                    let _ = events.send(PaneEvent::PtyOutput {
                        buffer,
                        data: buf[..n].to_vec(),
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("PTY read error: {err}");
                    break;
                }
            }
        }

        let code = poll_exit_code(&child);
        info!("Agent CLI exited with code {:?}", code);
        let _ = events.send(PaneEvent::PtyExited { buffer, code });
    });
}

/// Bounded non-blocking poll for the exit code after EOF.
///
/// Never holds the child lock across a blocking wait, so liveness queries
/// stay responsive while the process winds down.
fn poll_exit_code(child: &SharedChild) -> Option<i32> {
    for _ in 0..40 {
        match child.lock().try_wait() {
            Ok(Some(status)) => return Some(status.exit_code() as i32),
            Ok(None) => std::thread::sleep(Duration::from_millis(25)),
            Err(err) => {
                debug!("exit status query failed: {err}");
                return None;
            }
        }
    }
    None
}
