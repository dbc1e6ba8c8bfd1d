//! Session holders and the reuse-scope registry
//!
//! A holder is the triple (process, backing buffer, window) representing one
//! managed session. The registry keys holders by reuse scope: a global
//! singleton, a lazily-populated per-tab table, or nothing at all under the
//! `never` policy. Holders always start empty; populating them is the
//! session manager's job.

use crate::core::config::ReusePolicy;
use crate::host::{BufferId, TabId, WindowId};
use crate::pty::process::PtyProcess;
use std::collections::HashMap;
use std::sync::Arc;

/// Stable identity for a holder, independent of its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderId(pub u64);

/// One managed session: process handle, backing buffer, window.
///
/// Process and buffer are set and cleared together. The window is a weak
/// reference: it may be None while the process lives (the user closed the
/// pane), in which case the session is detached but alive and gets
/// reattached rather than recreated.
#[derive(Debug, Clone)]
pub struct Holder {
    id: HolderId,
    /// Child process, shared with any committed copies of this holder
    pub process: Option<Arc<PtyProcess>>,
    /// Buffer rendering the child's terminal output
    pub buffer: Option<BufferId>,
    /// Window currently showing the buffer, if any
    pub window: Option<WindowId>,
}

impl Holder {
    fn new(id: HolderId) -> Self {
        Self {
            id,
            process: None,
            buffer: None,
            window: None,
        }
    }

    /// Holder identity (stable across clones and commits)
    pub fn id(&self) -> HolderId {
        self.id
    }

    /// Whether the holder's process is present and still running
    pub fn is_alive(&self) -> bool {
        self.process.as_deref().map_or(false, PtyProcess::is_alive)
    }

    /// Clear the process/buffer pair, keeping the window reference
    pub fn clear_session(&mut self) {
        self.process = None;
        self.buffer = None;
    }
}

/// Maps reuse scopes to their holders
#[derive(Debug, Default)]
pub struct HolderRegistry {
    global: Option<Holder>,
    per_tab: HashMap<TabId, Holder>,
    next_id: u64,
}

impl HolderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> HolderId {
        self.next_id += 1;
        HolderId(self.next_id)
    }

    /// Resolve the holder for the given policy and scope, creating an empty
    /// one on first use. Under `never` the holder is fresh and never stored.
    pub fn active_holder(&mut self, policy: ReusePolicy, tab: TabId) -> Holder {
        match policy {
            ReusePolicy::Global => {
                if let Some(holder) = &self.global {
                    holder.clone()
                } else {
                    let holder = Holder::new(self.alloc_id());
                    self.global = Some(holder.clone());
                    holder
                }
            }
            ReusePolicy::Tab => {
                if let Some(holder) = self.per_tab.get(&tab) {
                    holder.clone()
                } else {
                    let holder = Holder::new(self.alloc_id());
                    self.per_tab.insert(tab, holder.clone());
                    holder
                }
            }
            ReusePolicy::Never => {
                let id = self.alloc_id();
                Holder::new(id)
            }
        }
    }

    /// Persist a holder back into its scope; no-op under `never`
    pub fn commit(&mut self, policy: ReusePolicy, tab: TabId, holder: Holder) {
        match policy {
            ReusePolicy::Global => self.global = Some(holder),
            ReusePolicy::Tab => {
                self.per_tab.insert(tab, holder);
            }
            ReusePolicy::Never => {}
        }
    }

    /// Remove a per-tab holder
    pub fn evict_tab(&mut self, tab: TabId) -> Option<Holder> {
        self.per_tab.remove(&tab)
    }

    /// Remove and return the holder whose backing buffer matches
    pub fn take_by_buffer(&mut self, buffer: BufferId) -> Option<Holder> {
        if self.global.as_ref().and_then(|h| h.buffer) == Some(buffer) {
            return self.global.take();
        }
        let tab = self
            .per_tab
            .iter()
            .find(|(_, holder)| holder.buffer == Some(buffer))
            .map(|(tab, _)| *tab)?;
        self.per_tab.remove(&tab)
    }

    /// Remove and return every stored holder, leaving the registry empty
    pub fn drain(&mut self) -> Vec<Holder> {
        let mut holders: Vec<Holder> = self.global.take().into_iter().collect();
        holders.extend(self.per_tab.drain().map(|(_, holder)| holder));
        holders
    }

    /// Number of stored holders
    pub fn len(&self) -> usize {
        self.global.is_some() as usize + self.per_tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
