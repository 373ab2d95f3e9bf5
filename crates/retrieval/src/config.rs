use crate::error::{Result, RetrievalError};
use context_code_window::WindowConfig;
use context_search::DEFAULT_SNIPPET_OVERHEAD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Where the similarity retriever gets its candidate windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilaritySource {
    /// Slide windows over the workspace files on every request
    #[default]
    WorkspaceWindows,
    /// Rank chunks from a pre-built chunk store
    ChunkStore,
}

/// Per-retriever wall-clock limits in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutOptions {
    pub similar_code_ms: u64,
    pub similar_usage_ms: u64,
    pub import_definitions_ms: u64,
    pub recently_edited_ms: u64,
    pub diff_ms: u64,
    pub clipboard_ms: u64,
}

impl Default for TimeoutOptions {
    fn default() -> Self {
        Self {
            similar_code_ms: 5000,
            similar_usage_ms: 5000,
            import_definitions_ms: 5000,
            recently_edited_ms: 5000,
            diff_ms: 5000,
            clipboard_ms: 5000,
        }
    }
}

impl TimeoutOptions {
    #[must_use]
    pub const fn uniform(millis: u64) -> Self {
        Self {
            similar_code_ms: millis,
            similar_usage_ms: millis,
            import_definitions_ms: millis,
            recently_edited_ms: millis,
            diff_ms: millis,
            clipboard_ms: millis,
        }
    }

    fn all(&self) -> [u64; 6] {
        [
            self.similar_code_ms,
            self.similar_usage_ms,
            self.import_definitions_ms,
            self.recently_edited_ms,
            self.diff_ms,
            self.clipboard_ms,
        ]
    }
}

/// Settings for one completion session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Prompt size; snippets get what the visible window leaves over
    pub max_prompt_tokens: usize,

    /// Extra tokens charged per snippet for its rendered header
    pub snippet_overhead_tokens: usize,

    pub max_clipboard_age_secs: u64,

    /// Token bound of the query window everything is ranked against
    pub query_window_tokens: usize,

    /// Token bound of the visible window when the caller does not supply one
    pub visible_window_tokens: usize,

    /// Workspace window geometry
    pub window_size: usize,
    pub slice_size: usize,

    /// Similar-code results kept before packing
    pub top_k: usize,

    /// Append `window_size / slice_size` lines after each similar-code window
    pub extend_forward: bool,

    /// Lines in a symbol-usage window
    pub usage_window_lines: usize,

    pub import_cache_capacity: usize,
    pub definition_cache_capacity: usize,

    pub use_imports: bool,
    pub use_recently_edited: bool,
    pub use_diff: bool,
    pub use_clipboard: bool,
    pub use_similar_code: bool,
    pub use_similar_usages: bool,

    /// Keep only symbol usages inside the workspace directories
    pub only_my_code: bool,

    /// File extensions indexed for similar code
    pub eligible_extensions: Vec<String>,

    pub similarity_source: SimilaritySource,

    pub timeouts: TimeoutOptions,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            max_prompt_tokens: 1024,
            snippet_overhead_tokens: DEFAULT_SNIPPET_OVERHEAD,
            max_clipboard_age_secs: 300,
            query_window_tokens: 128,
            visible_window_tokens: 512,
            window_size: 20,
            slice_size: 2,
            top_k: 10,
            extend_forward: true,
            usage_window_lines: 10,
            import_cache_capacity: 10,
            definition_cache_capacity: 50,
            use_imports: true,
            use_recently_edited: true,
            use_diff: true,
            use_clipboard: true,
            use_similar_code: true,
            use_similar_usages: true,
            only_my_code: true,
            eligible_extensions: ["py", "java", "rs", "js", "ts", "ipynb"]
                .into_iter()
                .map(String::from)
                .collect(),
            similarity_source: SimilaritySource::default(),
            timeouts: TimeoutOptions::default(),
        }
    }
}

impl AssemblyOptions {
    pub fn validate(&self) -> Result<()> {
        self.window_config()
            .validate()
            .map_err(|e| RetrievalError::invalid_config(e.to_string()))?;
        if self.query_window_tokens == 0 {
            return Err(RetrievalError::invalid_config("query_window_tokens must be > 0"));
        }
        if self.usage_window_lines == 0 {
            return Err(RetrievalError::invalid_config("usage_window_lines must be > 0"));
        }
        if self.timeouts.all().contains(&0) {
            return Err(RetrievalError::invalid_config("timeouts must be > 0 ms"));
        }
        if chrono::Duration::from_std(self.max_clipboard_age()).is_err() {
            return Err(RetrievalError::invalid_config(format!(
                "max_clipboard_age_secs {} is out of range",
                self.max_clipboard_age_secs
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig::new(self.window_size, self.slice_size)
    }

    #[must_use]
    pub fn max_clipboard_age(&self) -> Duration {
        Duration::from_secs(self.max_clipboard_age_secs)
    }

    /// Whether `path` has one of the eligible extensions
    pub fn is_eligible(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.eligible_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Read options from a TOML file; missing keys keep their defaults.
pub fn load_options(path: impl AsRef<Path>) -> Result<AssemblyOptions> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let options: AssemblyOptions = toml::from_str(&raw)?;
    options.validate()?;
    log::debug!("Loaded assembly options from {}", path.display());
    Ok(options)
}
