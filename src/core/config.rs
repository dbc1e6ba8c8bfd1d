//! Pane configuration
//!
//! Resolved once at setup time and treated as immutable afterwards. Omitted
//! fields keep their defaults (field-by-field merge) and unknown fields are
//! ignored, so a partial user table is always safe to apply.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Minimum width for vertical side panels, in cells
pub const MIN_PANE_WIDTH: u16 = 20;

/// Minimum height for horizontal side panels, in cells
pub const MIN_PANE_HEIGHT: u16 = 5;

/// How the pane window is split off from the editor layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    /// Vertical side panel
    #[default]
    Vsplit,
    /// Horizontal side panel
    Split,
    /// Centered floating window
    Float,
}

/// Which edge a vertical panel attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VsplitSide {
    #[default]
    Right,
    Left,
}

/// Which edge a horizontal panel attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitSide {
    #[default]
    Bottom,
    Top,
}

/// Session reuse granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReusePolicy {
    /// One session shared by the whole editor instance
    #[default]
    Global,
    /// One session per editor tab
    Tab,
    /// Fresh session on every invocation, never stored
    Never,
}

/// Pane size: a fraction of the editor dimension in (0,1), or an absolute
/// cell count. Integers parse as cells, floats as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaneSize {
    Cells(u32),
    Fraction(f64),
}

impl PaneSize {
    /// Usable fraction, if this size is one
    pub fn fraction(self) -> Option<f64> {
        match self {
            PaneSize::Fraction(f) if f > 0.0 && f < 1.0 => Some(f),
            _ => None,
        }
    }

    /// Panel width for a vertical split: `max(20, columns * fraction)` for a
    /// fraction in (0,1), `max(20, absolute)` otherwise
    pub fn width_cells(self, columns: u16) -> u16 {
        let width = match self.fraction() {
            Some(f) => (columns as f64 * f) as u16,
            None => self.absolute(),
        };
        width.max(MIN_PANE_WIDTH)
    }

    /// Panel height for a horizontal split: `max(5, rows * fraction)` for a
    /// fraction in (0,1), `max(5, absolute)` otherwise
    pub fn height_cells(self, rows: u16) -> u16 {
        let height = match self.fraction() {
            Some(f) => (rows as f64 * f) as u16,
            None => self.absolute(),
        };
        height.max(MIN_PANE_HEIGHT)
    }

    fn absolute(self) -> u16 {
        match self {
            PaneSize::Cells(n) => n.min(u16::MAX as u32) as u16,
            // Out-of-range fractions are treated as absolute cell counts
            PaneSize::Fraction(f) if f >= 1.0 => f as u16,
            PaneSize::Fraction(_) => 0,
        }
    }
}

/// Pane configuration, frozen after resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneConfig {
    /// Agent CLI command
    #[serde(default = "default_cmd")]
    pub cmd: String,

    /// Arguments passed to the agent CLI
    #[serde(default)]
    pub args: Vec<String>,

    /// Window split kind
    #[serde(default)]
    pub split: SplitKind,

    /// Pane size (fraction of the editor dimension, or absolute cells)
    #[serde(default = "default_size")]
    pub size: PaneSize,

    /// Session reuse policy
    #[serde(default)]
    pub reuse: ReusePolicy,

    /// Header line prepended to inline payloads
    #[serde(default = "default_context_header")]
    pub context_header: String,

    /// Wrap dispatched text in bracketed-paste framing
    #[serde(default = "default_true")]
    pub bracketed_paste: bool,

    /// Maximum inline payload body size in bytes
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Install terminal-local keymaps on the pane buffer
    #[serde(default = "default_true")]
    pub terminal_keymaps: bool,

    /// Edge for vertical panels
    #[serde(default)]
    pub vsplit_side: VsplitSide,

    /// Edge for horizontal panels
    #[serde(default)]
    pub split_side: SplitSide,

    /// Terminate tracked processes when the host exits
    #[serde(default = "default_true")]
    pub kill_on_exit: bool,
}

fn default_cmd() -> String {
    "claude".to_string()
}

fn default_size() -> PaneSize {
    PaneSize::Fraction(0.4)
}

fn default_context_header() -> String {
    "Context from editor:".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_payload_bytes() -> usize {
    100_000
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            cmd: default_cmd(),
            args: Vec::new(),
            split: SplitKind::default(),
            size: default_size(),
            reuse: ReusePolicy::default(),
            context_header: default_context_header(),
            bracketed_paste: true,
            max_payload_bytes: default_max_payload_bytes(),
            terminal_keymaps: true,
            vsplit_side: VsplitSide::default(),
            split_side: SplitSide::default(),
            kill_on_exit: true,
        }
    }
}

impl PaneConfig {
    /// Resolve a user overrides table (TOML) over the defaults.
    ///
    /// Omitted fields keep their defaults and unknown fields are ignored.
    /// Malformed input falls back to the full defaults with a warning;
    /// configuration problems never surface as hard failures.
    pub fn resolve(source: &str) -> Self {
        match toml::from_str(source) {
            Ok(config) => config,
            Err(err) => {
                warn!("invalid pane configuration, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Load configuration from the user's config file, defaults if absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            Ok(Self::resolve(&content))
        } else {
            Ok(Self::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "agentpane", "AgentPane")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaneConfig::default();
        assert_eq!(config.cmd, "claude");
        assert_eq!(config.split, SplitKind::Vsplit);
        assert_eq!(config.reuse, ReusePolicy::Global);
        assert_eq!(config.size, PaneSize::Fraction(0.4));
        assert!(config.bracketed_paste);
        assert!(config.kill_on_exit);
        assert_eq!(config.vsplit_side, VsplitSide::Right);
        assert_eq!(config.split_side, SplitSide::Bottom);
    }

    #[test]
    fn test_resolve_merges_field_by_field() {
        let config = PaneConfig::resolve(
            r#"
            cmd = "aider"
            reuse = "tab"
            "#,
        );
        assert_eq!(config.cmd, "aider");
        assert_eq!(config.reuse, ReusePolicy::Tab);
        // Omitted fields keep their defaults
        assert_eq!(config.split, SplitKind::Vsplit);
        assert!(config.bracketed_paste);
        assert_eq!(config.max_payload_bytes, 100_000);
    }

    #[test]
    fn test_resolve_ignores_unknown_fields() {
        let config = PaneConfig::resolve(
            r#"
            cmd = "claude"
            some_future_option = 42
            "#,
        );
        assert_eq!(config.cmd, "claude");
    }

    #[test]
    fn test_resolve_malformed_falls_back_to_defaults() {
        let config = PaneConfig::resolve("cmd = [not toml");
        assert_eq!(config, PaneConfig::default());
    }

    #[test]
    fn test_resolve_idempotent() {
        let source = r#"split = "float""#;
        assert_eq!(PaneConfig::resolve(source), PaneConfig::resolve(source));
    }

    #[test]
    fn test_size_parses_fraction_and_cells() {
        let config = PaneConfig::resolve("size = 0.3");
        assert_eq!(config.size, PaneSize::Fraction(0.3));

        let config = PaneConfig::resolve("size = 45");
        assert_eq!(config.size, PaneSize::Cells(45));
    }

    #[test]
    fn test_width_formula() {
        assert_eq!(PaneSize::Fraction(0.5).width_cells(120), 60);
        assert_eq!(PaneSize::Fraction(0.1).width_cells(100), 20); // floor
        assert_eq!(PaneSize::Cells(80).width_cells(120), 80);
        assert_eq!(PaneSize::Cells(4).width_cells(120), 20); // floor
    }

    #[test]
    fn test_height_formula() {
        assert_eq!(PaneSize::Fraction(0.25).height_cells(40), 10);
        assert_eq!(PaneSize::Fraction(0.05).height_cells(40), 5); // floor
        assert_eq!(PaneSize::Cells(12).height_cells(40), 12);
        assert_eq!(PaneSize::Cells(2).height_cells(40), 5); // floor
    }

    #[test]
    fn test_out_of_range_fraction_treated_as_absolute() {
        assert_eq!(PaneSize::Fraction(30.0).width_cells(120), 30);
        assert!(PaneSize::Fraction(1.5).fraction().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = PaneConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = PaneConfig::resolve(&toml_str);
        assert_eq!(parsed, config);
    }
}
