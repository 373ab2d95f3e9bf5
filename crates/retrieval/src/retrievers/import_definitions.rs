use super::{RetrievalContext, Retriever};
use crate::cache::{DefinitionSnippet, FileInfo, ImportDefinitionCache};
use crate::error::Result;
use crate::host::{FileHost, SymbolNavigator};
use async_trait::async_trait;
use context_code_window::{Language, Position};
use context_search::{symbols_for_snippet, Candidate, Snippet, SnippetOrigin};
use context_syntax::{import_scan_prefix, SyntaxParser};
use std::sync::Arc;

const PREFIX_LINES: usize = 5;
const SUFFIX_LINES: usize = 3;

/// The last five lines before the cursor followed by the first three after it.
pub fn text_around_cursor(contents: &str, cursor: Position) -> String {
    let offset = cursor.byte_offset(contents).unwrap_or(contents.len());
    let (prefix, suffix) = contents.split_at(offset);

    let prefix_lines: Vec<&str> = prefix.split('\n').collect();
    let tail = &prefix_lines[prefix_lines.len().saturating_sub(PREFIX_LINES)..];
    let head: Vec<&str> = suffix.split('\n').take(SUFFIX_LINES).collect();
    format!("{}{}", tail.join("\n"), head.join("\n"))
}

/// Definitions of imported symbols that appear near the cursor.
///
/// Only reads the cache; a file whose info has not been computed yet yields
/// nothing.
pub struct ImportDefinitionRetriever {
    cache: Arc<ImportDefinitionCache>,
}

impl ImportDefinitionRetriever {
    pub fn new(cache: Arc<ImportDefinitionCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Retriever for ImportDefinitionRetriever {
    fn name(&self) -> &'static str {
        "import-definitions"
    }

    async fn retrieve(&self, ctx: &RetrievalContext) -> Result<Vec<Candidate>> {
        let Some(info) = self.cache.get(&ctx.filepath) else {
            log::debug!("No import info cached for {}", ctx.filepath);
            return Ok(Vec::new());
        };

        let keywords = Language::from_path(&ctx.filepath).top_level_keywords();
        let symbols = symbols_for_snippet(&text_around_cursor(&ctx.contents, ctx.cursor));

        Ok(symbols
            .iter()
            .filter(|symbol| !keywords.contains(&symbol.as_str()))
            .flat_map(|symbol| info.definitions(symbol))
            .map(|definition| {
                Candidate::new(
                    SnippetOrigin::ImportDefinition,
                    Snippet::code(definition.filepath.clone(), definition.contents.clone()),
                )
            })
            .collect())
    }
}

/// Computes [`FileInfo`] entries when a file gains focus
pub struct ImportDefinitionIndexer {
    files: Arc<dyn FileHost>,
    navigator: Arc<dyn SymbolNavigator>,
    parser: Arc<dyn SyntaxParser>,
    cache: Arc<ImportDefinitionCache>,
}

impl ImportDefinitionIndexer {
    pub fn new(
        files: Arc<dyn FileHost>,
        navigator: Arc<dyn SymbolNavigator>,
        parser: Arc<dyn SyntaxParser>,
        cache: Arc<ImportDefinitionCache>,
    ) -> Self {
        Self {
            files,
            navigator,
            parser,
            cache,
        }
    }

    /// Recompute and store the entry for `path`.
    ///
    /// A missing file drops its entry. The result is discarded when the cache
    /// was invalidated while it was being computed.
    pub async fn refresh(&self, path: &str) -> Result<Option<Arc<FileInfo>>> {
        let key = path.to_string();
        let epoch = self.cache.epoch();

        let info = match self.compute(path).await {
            Ok(Some(info)) => info,
            Ok(None) => return Ok(None),
            Err(e) if e.is_not_found() => {
                self.cache.invalidate(&key);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let symbols = info.imports.len();
        if !self.cache.insert_if_current(key.clone(), info, epoch) {
            log::debug!("Discarding import info for {path}: invalidated while computing");
            return Ok(None);
        }
        log::debug!("Cached import definitions for {path}: {symbols} symbols");
        Ok(self.cache.get(&key))
    }

    async fn compute(&self, path: &str) -> Result<Option<FileInfo>> {
        if Language::from_path(path) == Language::Notebook {
            return Ok(None);
        }

        let content = self.files.read_file(path).await?;
        let Some(tree) = self.parser.parse(path, import_scan_prefix(&content))? else {
            return Ok(None);
        };

        let mut info = FileInfo::default();
        for (symbol, position) in tree.imported_symbols() {
            let definition = match self.navigator.definition(path, position).await {
                Ok(Some(definition)) => definition,
                Ok(None) => continue,
                Err(e) => {
                    log::debug!("Definition lookup for {symbol} failed: {e}");
                    continue;
                }
            };
            let read = self.files.read_range(&definition.filepath, definition.range).await;
            let contents = match read {
                Ok(contents) => contents,
                Err(e) => {
                    log::debug!("Reading definition of {symbol} failed: {e}");
                    continue;
                }
            };
            info.imports.entry(symbol).or_default().push(DefinitionSnippet {
                filepath: definition.filepath,
                range: definition.range,
                contents,
            });
        }
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_code_window::Range;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_around_cursor() {
        let contents = "l0\nl1\nl2\nl3\nl4\nl5\nl6 cur\nl7\nl8\nl9\nl10";
        let text = text_around_cursor(contents, Position::new(6, 3));
        assert_eq!(text, "l2\nl3\nl4\nl5\nl6 cur\nl7\nl8");
    }

    #[test]
    fn test_text_around_cursor_at_file_edges() {
        assert_eq!(text_around_cursor("only", Position::new(0, 2)), "only");
        assert_eq!(text_around_cursor("", Position::new(0, 0)), "");
    }

    fn ctx(contents: &str, cursor: Position) -> RetrievalContext {
        RetrievalContext {
            filepath: "app.py".into(),
            contents: contents.into(),
            cursor,
            query_window: String::new(),
        }
    }

    fn definition(name: &str) -> DefinitionSnippet {
        DefinitionSnippet {
            filepath: format!("{name}.py"),
            range: Range::lines(0, 1),
            contents: format!("def {name}():\n    pass"),
        }
    }

    #[tokio::test]
    async fn test_cold_cache_yields_nothing() {
        let retriever = ImportDefinitionRetriever::new(Arc::new(ImportDefinitionCache::new(10)));
        let candidates = retriever
            .retrieve(&ctx("helper()", Position::new(0, 7)))
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_symbols_near_cursor_resolve_to_definitions() {
        let cache = Arc::new(ImportDefinitionCache::new(10));
        let mut info = FileInfo::default();
        info.imports.insert("helper".into(), vec![definition("helper")]);
        info.imports.insert("unused".into(), vec![definition("unused")]);
        // keyword collisions are ignored
        info.imports.insert("def".into(), vec![definition("def")]);
        cache.insert("app.py".into(), info);

        let retriever = ImportDefinitionRetriever::new(cache);
        let candidates = retriever
            .retrieve(&ctx("def run():\n    helper(", Position::new(1, 11)))
            .await
            .unwrap();

        let paths: Vec<Option<&str>> = candidates.iter().map(|c| c.snippet.filepath()).collect();
        assert_eq!(paths, vec![Some("helper.py")]);
        assert_eq!(candidates[0].origin, SnippetOrigin::ImportDefinition);
    }
}
