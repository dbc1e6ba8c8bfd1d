//! Payload construction
//!
//! Turns a line selection into what actually gets written to the agent:
//! either a compact `@path[:lines]` reference the agent can re-read itself,
//! or a fenced, size-bounded inline block when the buffer has unsaved edits
//! (or no path at all) and on-disk content would lie.

use crate::host::BufferSnapshot;
use std::path::Path;

/// 1-based inclusive line range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Build a range, clamping an inverted end up to start and a zero start
    /// up to line 1.
    pub fn new(start: usize, end: usize) -> Self {
        let start = start.max(1);
        Self {
            start,
            end: end.max(start),
        }
    }
}

/// Build a file-reference token: `@path`, `@path:N`, or `@path:start-end`.
pub fn build_reference(path: &Path, range: Option<LineRange>) -> String {
    let path = path.display();
    match range {
        None => format!("@{path}"),
        Some(LineRange { start, end }) if start == end => format!("@{path}:{start}"),
        Some(LineRange { start, end }) => format!("@{path}:{start}-{end}"),
    }
}

/// Build an inline fenced payload.
///
/// The body is the lines joined with newlines, truncated to at most
/// `max_bytes` bytes. Truncation backs off to the nearest char boundary so
/// the result stays valid UTF-8; for ASCII content this is exact byte
/// truncation. When anything is dropped the header is annotated with the
/// omitted byte count. Always ends with a newline after the closing fence.
pub fn build_inline(
    header: &str,
    lines: &[String],
    language: Option<&str>,
    max_bytes: usize,
) -> String {
    let mut body = lines.join("\n");
    let mut header = header.to_string();

    if body.len() > max_bytes {
        let mut cut = max_bytes;
        while cut > 0 && !body.is_char_boundary(cut) {
            cut -= 1;
        }
        let omitted = body.len() - cut;
        body.truncate(cut);
        header.push_str(&format!(" (truncated, omitted {omitted} bytes)"));
    }

    let tag = language.unwrap_or("");
    format!("{header}\n```{tag}\n{body}\n```\n")
}

/// Apply the selection policy to a source buffer and produce a payload.
///
/// Unmodified buffer with a concrete path: a file reference, which is
/// cheaper and lets the agent re-read live content. Anything else: inline
/// content, since the on-disk file would not reflect the edits. `range`
/// of `None` means the whole buffer. An empty resolved selection yields
/// `None` and nothing is sent.
pub fn from_snapshot(
    snapshot: &BufferSnapshot,
    range: Option<LineRange>,
    header: &str,
    max_bytes: usize,
) -> Option<String> {
    let selected: &[String] = match range {
        None => snapshot.lines.as_slice(),
        Some(LineRange { start, end }) => {
            if start > snapshot.lines.len() {
                &[]
            } else {
                let end = end.min(snapshot.lines.len());
                &snapshot.lines[start - 1..end]
            }
        }
    };

    if selected.is_empty() {
        return None;
    }

    if !snapshot.modified {
        if let Some(path) = &snapshot.path {
            return Some(build_reference(path, range));
        }
    }

    Some(build_inline(
        header,
        selected,
        snapshot.filetype.as_deref(),
        max_bytes,
    ))
}
