use serde::{Deserialize, Serialize};

/// Zero-based line/column location inside a buffer.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Byte offset of this position in `text`.
    ///
    /// Columns past the end of a line clamp to the line end. Returns `None`
    /// when the line does not exist.
    #[must_use]
    pub fn byte_offset(&self, text: &str) -> Option<usize> {
        let mut offset = 0;
        for (idx, line) in text.split('\n').enumerate() {
            if idx == self.line {
                let column = line
                    .char_indices()
                    .nth(self.column)
                    .map_or(line.len(), |(byte, _)| byte);
                return Some(offset + column);
            }
            offset += line.len() + 1;
        }
        None
    }

    /// Inverse of [`Position::byte_offset`]; offsets past the end clamp to the last line.
    #[must_use]
    pub fn from_byte_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text[..floor_char_boundary(text, offset)];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        Self {
            line,
            column: before[line_start..].chars().count(),
        }
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Span between two positions, `start <= end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range, swapping the endpoints if they arrive reversed.
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Range covering whole lines `start_line..=end_line`.
    #[must_use]
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self::new(Position::new(start_line, 0), Position::new(end_line, 0))
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    #[must_use]
    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Where a window came from and how it was cut.
///
/// `start_line..end_line` is half-open, `line_no` is the anchor line the
/// window was built around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMetadata {
    pub filepath: String,
    pub line_no: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub window_size: usize,
    pub slice_size: usize,
}

impl WindowMetadata {
    /// Number of lines covered by the window
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// A contiguous slice of a file's lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWindow {
    pub content: String,
    pub range: Range,
    pub metadata: WindowMetadata,
}

impl SourceWindow {
    #[must_use]
    pub fn filepath(&self) -> &str {
        &self.metadata.filepath
    }
}

/// Deduplicated workspace window: unique text plus every location that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    pub content: String,
    pub locations: Vec<WindowMetadata>,
}

impl CodeChunk {
    /// First location that produced this text
    #[must_use]
    pub fn primary_location(&self) -> Option<&WindowMetadata> {
        self.locations.first()
    }
}
