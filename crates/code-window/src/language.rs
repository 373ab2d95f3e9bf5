use serde::{Deserialize, Serialize};
use std::path::Path;

/// Programming language of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Notebook,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyw" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "go" => Language::Go,
            "ipynb" => Language::Notebook,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Notebook => "notebook",
            Language::Unknown => "unknown",
        }
    }

    /// Check if a syntax tree can be produced for this language
    pub fn supports_ast(self) -> bool {
        matches!(
            self,
            Language::Rust | Language::Python | Language::JavaScript | Language::TypeScript
        )
    }

    /// Keywords that open top-level declarations.
    ///
    /// They appear next to almost every cursor, so symbol lookups skip them.
    pub fn top_level_keywords(self) -> &'static [&'static str] {
        match self {
            Language::Rust => &[
                "fn", "trait", "impl", "struct", "enum", "mod", "use", "pub", "const", "static",
                "type",
            ],
            Language::Python => &["def", "class", "import", "from", "async"],
            Language::JavaScript | Language::TypeScript => &[
                "function", "class", "module", "export", "import", "interface", "type", "const",
            ],
            Language::Java => &["class", "interface", "enum", "public", "private", "import"],
            Language::Go => &["func", "type", "package", "import", "var", "const"],
            Language::Notebook | Language::Unknown => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("PY"), Language::Python);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("ipynb"), Language::Notebook);
        assert_eq!(Language::from_extension("md"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/lib.rs"), Language::Rust);
        assert_eq!(Language::from_path("pkg/Main.java"), Language::Java);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
    }

    #[test]
    fn test_supports_ast() {
        assert!(Language::Python.supports_ast());
        assert!(Language::TypeScript.supports_ast());
        assert!(!Language::Java.supports_ast());
        assert!(!Language::Notebook.supports_ast());
    }

    #[test]
    fn test_top_level_keywords() {
        assert!(Language::Python.top_level_keywords().contains(&"def"));
        assert!(Language::Rust.top_level_keywords().contains(&"fn"));
        assert!(Language::Unknown.top_level_keywords().is_empty());
    }
}
