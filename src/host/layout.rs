//! Window sizing math
//!
//! Turns the configured split kind and size into concrete cell geometry for
//! the host to realize. Side panels keep a usable floor (20 columns / 5 rows);
//! floats are centered.

use crate::core::config::{PaneConfig, PaneSize, SplitKind, SplitSide, VsplitSide};

/// Computed geometry for the pane window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLayout {
    /// Vertical side panel of the given width
    Vertical { width: u16, side: VsplitSide },
    /// Horizontal side panel of the given height
    Horizontal { height: u16, side: SplitSide },
    /// Centered floating window
    Float {
        width: u16,
        height: u16,
        row: u16,
        col: u16,
    },
}

impl WindowLayout {
    /// Terminal grid dimensions (rows, cols) for a PTY backing this window
    pub fn terminal_size(&self, columns: u16, rows: u16) -> (u16, u16) {
        match *self {
            WindowLayout::Vertical { width, .. } => (rows, width),
            WindowLayout::Horizontal { height, .. } => (height, columns),
            WindowLayout::Float { width, height, .. } => (height, width),
        }
    }
}

/// Compute the pane window layout for the current editor dimensions.
pub fn compute_layout(config: &PaneConfig, columns: u16, rows: u16) -> WindowLayout {
    match config.split {
        SplitKind::Vsplit => WindowLayout::Vertical {
            width: config.size.width_cells(columns),
            side: config.vsplit_side,
        },
        SplitKind::Split => WindowLayout::Horizontal {
            height: config.size.height_cells(rows),
            side: config.split_side,
        },
        SplitKind::Float => {
            // Floats need a fraction for both axes; non-fraction sizes fall
            // back to half the editor.
            let fraction = config.size.fraction().unwrap_or(0.5);
            let size = PaneSize::Fraction(fraction);
            let width = size.width_cells(columns);
            let height = size.height_cells(rows);
            WindowLayout::Float {
                width,
                height,
                row: rows.saturating_sub(height) / 2,
                col: columns.saturating_sub(width) / 2,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ReusePolicy;

    fn config_with(split: SplitKind, size: PaneSize) -> PaneConfig {
        PaneConfig {
            split,
            size,
            reuse: ReusePolicy::Never,
            ..PaneConfig::default()
        }
    }

    #[test]
    fn test_vsplit_width_from_fraction() {
        let config = config_with(SplitKind::Vsplit, PaneSize::Fraction(0.25));
        let layout = compute_layout(&config, 160, 50);
        assert_eq!(
            layout,
            WindowLayout::Vertical {
                width: 40,
                side: VsplitSide::Right
            }
        );
    }

    #[test]
    fn test_split_height_from_cells() {
        let config = config_with(SplitKind::Split, PaneSize::Cells(12));
        let layout = compute_layout(&config, 160, 50);
        assert_eq!(
            layout,
            WindowLayout::Horizontal {
                height: 12,
                side: SplitSide::Bottom
            }
        );
    }

    #[test]
    fn test_float_centered() {
        let config = config_with(SplitKind::Float, PaneSize::Fraction(0.5));
        let layout = compute_layout(&config, 120, 40);
        assert_eq!(
            layout,
            WindowLayout::Float {
                width: 60,
                height: 20,
                row: 10,
                col: 30,
            }
        );
    }

    #[test]
    fn test_float_falls_back_to_half_for_absolute_size() {
        let config = config_with(SplitKind::Float, PaneSize::Cells(45));
        match compute_layout(&config, 120, 40) {
            WindowLayout::Float { width, height, .. } => {
                assert_eq!(width, 60);
                assert_eq!(height, 20);
            }
            other => panic!("expected float layout, got {other:?}"),
        }
    }

    #[test]
    fn test_terminal_size_per_layout() {
        let vertical = WindowLayout::Vertical {
            width: 40,
            side: VsplitSide::Left,
        };
        assert_eq!(vertical.terminal_size(120, 50), (50, 40));

        let horizontal = WindowLayout::Horizontal {
            height: 15,
            side: SplitSide::Top,
        };
        assert_eq!(horizontal.terminal_size(120, 50), (15, 120));

        let float = WindowLayout::Float {
            width: 60,
            height: 20,
            row: 10,
            col: 30,
        };
        assert_eq!(float.terminal_size(120, 50), (20, 60));
    }
}
