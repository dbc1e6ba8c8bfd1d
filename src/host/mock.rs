//! Mock editor host for tests
//!
//! Records every window, focus change, and scheduled task so tests can
//! assert on what the core asked the host to do, without a real editor.

use crate::host::{
    BufferId, BufferSnapshot, Host, HostError, ScheduledTask, TabId, WindowId, WindowLayout,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// In-memory [`Host`] implementation
pub struct MockHost {
    columns: u16,
    rows: u16,
    tab: TabId,
    next_id: u64,
    valid_windows: HashSet<WindowId>,
    source_buffers: HashMap<BufferId, BufferSnapshot>,
    current_buffer: Option<BufferId>,

    /// Active visual selection, if any
    pub visual: Option<(usize, usize)>,
    /// Whether a selection mode is currently active
    pub selection_active: bool,
    /// The window last focused by the core
    pub focused: Option<WindowId>,
    /// Number of times terminal-input mode was entered
    pub insert_entered: usize,
    /// Number of collapse_selection calls
    pub collapsed: usize,
    /// Total windows ever opened
    pub opened_windows: usize,
    /// Layout used for each opened window, in order
    pub opened_layouts: Vec<WindowLayout>,
    /// Buffers that had terminal keymaps installed
    pub keymaps_installed: Vec<BufferId>,
    /// Deferred tasks, in scheduling order
    pub scheduled: Vec<(Duration, ScheduledTask)>,
}

impl MockHost {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            tab: TabId(1),
            next_id: 0,
            valid_windows: HashSet::new(),
            source_buffers: HashMap::new(),
            current_buffer: None,
            visual: None,
            selection_active: false,
            focused: None,
            insert_entered: 0,
            collapsed: 0,
            opened_windows: 0,
            opened_layouts: Vec::new(),
            keymaps_installed: Vec::new(),
            scheduled: Vec::new(),
        }
    }

    /// Switch the simulated current tab
    pub fn set_tab(&mut self, tab: TabId) {
        self.tab = tab;
    }

    /// Register a source buffer the user would send from
    pub fn add_source_buffer(&mut self, snapshot: BufferSnapshot) -> BufferId {
        let id = BufferId(self.alloc());
        self.source_buffers.insert(id, snapshot);
        id
    }

    /// Make a buffer the current one
    pub fn set_current_buffer(&mut self, buffer: BufferId) {
        self.current_buffer = Some(buffer);
    }

    /// Simulate the user closing a window out from under the core
    pub fn invalidate_window(&mut self, window: WindowId) {
        self.valid_windows.remove(&window);
    }

    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for MockHost {
    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn current_tab(&self) -> TabId {
        self.tab
    }

    fn current_buffer(&self) -> Option<BufferId> {
        self.current_buffer
    }

    fn visual_selection(&self) -> Option<(usize, usize)> {
        self.visual
    }

    fn snapshot(&self, buffer: BufferId) -> Option<BufferSnapshot> {
        self.source_buffers.get(&buffer).cloned()
    }

    fn create_terminal_buffer(&mut self) -> Result<BufferId, HostError> {
        Ok(BufferId(self.alloc()))
    }

    fn open_window(
        &mut self,
        _buffer: BufferId,
        layout: &WindowLayout,
    ) -> Result<WindowId, HostError> {
        let window = WindowId(self.alloc());
        self.valid_windows.insert(window);
        self.opened_windows += 1;
        self.opened_layouts.push(*layout);
        Ok(window)
    }

    fn window_is_valid(&self, window: WindowId) -> bool {
        self.valid_windows.contains(&window)
    }

    fn focus_window(&mut self, window: WindowId) -> Result<(), HostError> {
        if !self.valid_windows.contains(&window) {
            return Err(HostError::StaleWindow(window));
        }
        self.focused = Some(window);
        Ok(())
    }

    fn close_window(&mut self, window: WindowId) -> Result<(), HostError> {
        if !self.valid_windows.remove(&window) {
            return Err(HostError::StaleWindow(window));
        }
        if self.focused == Some(window) {
            self.focused = None;
        }
        Ok(())
    }

    fn enter_terminal_input(&mut self, window: WindowId) -> Result<(), HostError> {
        if !self.valid_windows.contains(&window) {
            return Err(HostError::StaleWindow(window));
        }
        self.insert_entered += 1;
        Ok(())
    }

    fn selection_active(&self) -> bool {
        self.selection_active
    }

    fn collapse_selection(&mut self) {
        self.selection_active = false;
        self.collapsed += 1;
    }

    fn install_terminal_keymaps(&mut self, buffer: BufferId) {
        self.keymaps_installed.push(buffer);
    }

    fn schedule(&mut self, delay: Duration, task: ScheduledTask) {
        self.scheduled.push((delay, task));
    }
}
