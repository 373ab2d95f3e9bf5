use crate::error::{Result, SearchError};
use crate::snippet::Snippet;
use chrono::{DateTime, Duration, Utc};

/// Clipboard entries older than this are stale
pub const DEFAULT_MAX_CLIPBOARD_AGE: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Why a snippet was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    AlreadyVisible,
    ClipboardUndated,
    ClipboardExpired,
}

/// Drops snippets that add nothing to the prompt.
///
/// Rules run in order: blank content, code already inside the visible
/// window, clipboard text older than the age limit.
#[derive(Debug, Clone)]
pub struct ValidityFilter {
    visible_window: String,
    now: DateTime<Utc>,
    max_clipboard_age: Duration,
}

impl ValidityFilter {
    pub fn new(visible_window: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            visible_window: visible_window.into(),
            now,
            max_clipboard_age: Duration::seconds(DEFAULT_MAX_CLIPBOARD_AGE.as_secs() as i64),
        }
    }

    pub fn with_max_clipboard_age(mut self, age: std::time::Duration) -> Result<Self> {
        self.max_clipboard_age = Duration::from_std(age)
            .map_err(|e| SearchError::invalid_config(format!("max clipboard age: {e}")))?;
        Ok(self)
    }

    /// First rule the snippet breaks, if any
    pub fn check(&self, snippet: &Snippet) -> Option<Rejection> {
        let trimmed = snippet.content().trim();
        if trimmed.is_empty() {
            return Some(Rejection::Empty);
        }
        match snippet {
            Snippet::Code { .. } if self.visible_window.contains(trimmed) => {
                Some(Rejection::AlreadyVisible)
            }
            Snippet::Clipboard { copied_at: None, .. } => Some(Rejection::ClipboardUndated),
            Snippet::Clipboard {
                copied_at: Some(copied_at),
                ..
            } if self.now - *copied_at > self.max_clipboard_age => {
                Some(Rejection::ClipboardExpired)
            }
            _ => None,
        }
    }

    pub fn is_valid(&self, snippet: &Snippet) -> bool {
        self.check(snippet).is_none()
    }
}
