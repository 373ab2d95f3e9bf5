//! Workspace Window Index.
//!
//! Every eligible file is cut into overlapping line windows; windows with
//! byte-identical text collapse into one [`CodeChunk`] that remembers each
//! place it came from. The index is rebuilt from scratch for every request.

use crate::config::WindowConfig;
use crate::types::{CodeChunk, Range, SourceWindow, WindowMetadata};
use crate::window::split_lines;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A workspace file handed to the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFile {
    pub path: String,
    pub content: String,
}

impl WorkspaceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Sliding windows for one file.
///
/// Anchors advance by [`WindowConfig::slice_step`]; each window takes half of
/// `window_size` before the anchor and the rest after it, clamped to the file.
/// Whitespace-only windows are skipped.
pub fn windows_for_file(file: &WorkspaceFile, config: &WindowConfig) -> Vec<SourceWindow> {
    let lines = split_lines(&file.content);
    let total = lines.len();
    let delta = config.window_size / 2;
    let step = config.slice_step();

    let mut windows = Vec::with_capacity(total / step + 1);
    for line_no in (0..total).step_by(step) {
        let start_line = line_no.saturating_sub(delta);
        let end_line = total.min(line_no + config.window_size - delta);
        if start_line >= end_line {
            continue;
        }
        let content = lines[start_line..end_line].join("\n");
        if content.trim().is_empty() {
            continue;
        }
        windows.push(SourceWindow {
            content,
            range: Range::lines(start_line, end_line - 1),
            metadata: WindowMetadata {
                filepath: file.path.clone(),
                line_no,
                start_line,
                end_line,
                window_size: config.window_size,
                slice_size: config.slice_size,
            },
        });
    }
    windows
}

/// Merge windows by exact content, keeping locations in first-seen order.
fn merge_identical(windows: Vec<SourceWindow>) -> Vec<CodeChunk> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(windows.len());
    let mut chunks: Vec<CodeChunk> = Vec::new();

    for window in windows {
        match slots.get(&window.content) {
            Some(&slot) => chunks[slot].locations.push(window.metadata),
            None => {
                slots.insert(window.content.clone(), chunks.len());
                chunks.push(CodeChunk {
                    content: window.content,
                    locations: vec![window.metadata],
                });
            }
        }
    }
    chunks
}

/// Build the deduplicated window set for a whole workspace.
pub fn build_windows(files: &[WorkspaceFile], config: &WindowConfig) -> Vec<CodeChunk> {
    let windows: Vec<SourceWindow> = files
        .iter()
        .flat_map(|file| windows_for_file(file, config))
        .collect();
    let window_count = windows.len();
    let chunks = merge_identical(windows);

    log::debug!(
        "Window index: {} files, {} windows, {} unique chunks",
        files.len(),
        window_count,
        chunks.len()
    );
    chunks
}

/// Re-cut a window from fresh file text, adding `extra_lines` after its end.
pub fn extend_window_forward(
    content: &str,
    location: &WindowMetadata,
    extra_lines: usize,
) -> String {
    let lines = split_lines(content);
    let start = location.start_line.min(lines.len());
    let end = lines.len().min(location.end_line + extra_lines).max(start);
    lines[start..end].join("\n")
}
