//! Windows cut around a single location.
//!
//! [`extract_window`] grows a token-bounded window around the cursor and is
//! used as the query every candidate is scored against. [`fixed_window`] cuts
//! a line-count window around a symbol reference.

use crate::encoder::TokenEncoder;
use crate::types::{Position, Range, SourceWindow, WindowMetadata};

/// Split a buffer into lines, tolerating `\r\n` endings.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn join<S: AsRef<str>>(lines: &[S], start: usize, end: usize) -> String {
    lines[start..end]
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Half-open line range of the token-bounded window around `cursor`.
///
/// 1. Grow `[line, line + 1)` one line on both sides while the joined text
///    still encodes to `<= max_tokens`; stop as soon as either side reaches a
///    file boundary and keep the last range that fit.
/// 2. Extend upward one line at a time while the result still fits.
/// 3. Extend downward the same way.
///
/// Every step re-encodes the candidate text once, so the number of encode
/// calls is bounded by the number of lines the window can hold.
pub fn extract_window_range<S, E>(
    cursor: Position,
    lines: &[S],
    max_tokens: usize,
    encoder: &E,
) -> (usize, usize)
where
    S: AsRef<str>,
    E: TokenEncoder + ?Sized,
{
    let total = lines.len();
    if total == 0 {
        return (0, 0);
    }
    let anchor = cursor.line.min(total - 1);
    let fits = |start: usize, end: usize| encoder.count(&join(lines, start, end)) <= max_tokens;

    let (mut start, mut end) = (anchor, anchor + 1);
    let mut fitted = (anchor, anchor);
    loop {
        if !fits(start, end) {
            break;
        }
        fitted = (start, end);
        if start == 0 || end == total {
            break;
        }
        start -= 1;
        end += 1;
    }

    let (mut start, mut end) = fitted;
    while start > 0 && fits(start - 1, end) {
        start -= 1;
    }
    while end < total && fits(start, end + 1) {
        end += 1;
    }
    (start, end)
}

/// Token-bounded text window centered on `cursor`.
///
/// The result encodes to at most `max_tokens` tokens; when the whole file
/// fits, the whole file is returned.
pub fn extract_window<S, E>(cursor: Position, lines: &[S], max_tokens: usize, encoder: &E) -> String
where
    S: AsRef<str>,
    E: TokenEncoder + ?Sized,
{
    let (start, end) = extract_window_range(cursor, lines, max_tokens, encoder);
    join(lines, start, end)
}

/// Fixed-length window of `window_lines` lines around `range`.
///
/// The lines not covered by `range` are split evenly before and after it,
/// limited by the start of the file; the end is clamped to the file length.
pub fn fixed_window<S: AsRef<str>>(
    filepath: &str,
    lines: &[S],
    range: Range,
    window_lines: usize,
) -> SourceWindow {
    let total = lines.len();
    let start_line = range.start.line.min(total.saturating_sub(1));
    let end_line = range.end.line.max(start_line);
    let spare = window_lines.saturating_sub(end_line - start_line + 1);
    let prefix = start_line.min(spare / 2);

    let window_start = start_line - prefix;
    let window_end = total.min(window_start + window_lines);
    let content = if window_start < window_end {
        join(lines, window_start, window_end)
    } else {
        String::new()
    };

    SourceWindow {
        content,
        range: Range::lines(window_start, window_end.saturating_sub(1).max(window_start)),
        metadata: WindowMetadata {
            filepath: filepath.to_string(),
            line_no: range.start.line,
            start_line: window_start,
            end_line: window_end.max(window_start),
            window_size: window_lines,
            slice_size: 1,
        },
    }
}
