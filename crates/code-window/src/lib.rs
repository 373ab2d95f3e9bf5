//! # Context Code Window
//!
//! Line-window primitives used to build completion context.
//!
//! ## Architecture
//!
//! ```text
//! Buffer lines + cursor
//!     │
//!     ├──> Window Extractor (token-bounded, centered on the cursor)
//!     │      └─> query window for ranking
//!     │
//!     ├──> Fixed usage windows (N lines around a reference)
//!     │
//!     └──> Workspace Window Index
//!          ├─> sliding windows per eligible file (step = window / slice)
//!          └─> merge identical text → CodeChunk[] with every origin
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_code_window::{extract_window, LexicalEncoder, Position};
//!
//! let lines = vec!["fn main() {", "    let x = compute();", "}"];
//! let window = extract_window(Position::new(1, 4), &lines, 64, &LexicalEncoder::new());
//! assert!(window.contains("compute"));
//! ```

mod config;
mod encoder;
mod error;
mod index;
mod language;
mod types;
mod window;

pub use config::WindowConfig;
pub use encoder::{LexicalEncoder, TokenEncoder};
pub use error::{Result, WindowError};
pub use index::{build_windows, extend_window_forward, windows_for_file, WorkspaceFile};
pub use language::Language;
pub use types::{CodeChunk, Position, Range, SourceWindow, WindowMetadata};
pub use window::{extract_window, extract_window_range, fixed_window, split_lines};
