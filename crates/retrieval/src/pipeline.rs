use crate::cache::{FileInfo, ImportDefinitionCache};
use crate::chunk_store::ChunkStore;
use crate::config::AssemblyOptions;
use crate::error::{Result, RetrievalError};
use crate::host::{EditorSources, FileHost, SymbolNavigator};
use crate::navigation::CachedNavigator;
use crate::request::{AssembledContext, CompletionRequest};
use crate::retrievers::{
    ClipboardRetriever, DiffRetriever, ImportDefinitionIndexer, ImportDefinitionRetriever,
    RecentlyEditedRetriever, RetrievalContext, Retriever, SimilarCodeRetriever,
    SimilarUsageRetriever,
};
use chrono::Utc;
use context_code_window::{extract_window, split_lines, LexicalEncoder, TokenEncoder};
use context_search::{rank_snippets, BudgetPacker, Candidate, ValidityFilter};
use context_syntax::{SyntaxParser, TreeSitterParser};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Runs one retriever under its time limit; errors and timeouts become empty.
async fn run_guarded(
    retriever: &dyn Retriever,
    enabled: bool,
    timeout_ms: u64,
    ctx: &RetrievalContext,
) -> Vec<Candidate> {
    if !enabled {
        return Vec::new();
    }
    match tokio::time::timeout(Duration::from_millis(timeout_ms), retriever.retrieve(ctx)).await {
        Ok(Ok(candidates)) => {
            log::debug!("{}: {} candidates", retriever.name(), candidates.len());
            candidates
        }
        Ok(Err(e)) => {
            log::warn!("{} retriever failed: {e}", retriever.name());
            Vec::new()
        }
        Err(_) => {
            log::warn!("{} retriever timed out after {timeout_ms}ms", retriever.name());
            Vec::new()
        }
    }
}

/// Assembles completion context for one editor session.
///
/// Owns the session caches and the generation counter. Every call to
/// [`ContextAssembler::assemble_context`] starts a new generation; a call
/// that reaches its join point after a newer one started is reported as
/// [`RetrievalError::Superseded`].
pub struct ContextAssembler {
    options: Arc<AssemblyOptions>,
    files: Arc<dyn FileHost>,
    navigator: Arc<CachedNavigator>,
    editor: Arc<dyn EditorSources>,
    parser: Arc<dyn SyntaxParser>,
    encoder: Arc<dyn TokenEncoder>,
    chunk_store: Option<Arc<dyn ChunkStore>>,
    import_cache: Arc<ImportDefinitionCache>,
    generation: AtomicU64,
}

impl ContextAssembler {
    /// Create an assembler with the tree-sitter parser and the lexical encoder
    pub fn new(
        options: AssemblyOptions,
        files: Arc<dyn FileHost>,
        navigator: Arc<dyn SymbolNavigator>,
        editor: Arc<dyn EditorSources>,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            navigator: Arc::new(CachedNavigator::new(navigator, options.definition_cache_capacity)),
            import_cache: Arc::new(ImportDefinitionCache::new(options.import_cache_capacity)),
            options: Arc::new(options),
            files,
            editor,
            parser: Arc::new(TreeSitterParser::new()),
            encoder: Arc::new(LexicalEncoder::new()),
            chunk_store: None,
            generation: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn SyntaxParser>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn TokenEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    #[must_use]
    pub fn with_chunk_store(mut self, store: Arc<dyn ChunkStore>) -> Self {
        self.chunk_store = Some(store);
        self
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    pub fn import_cache(&self) -> &ImportDefinitionCache {
        &self.import_cache
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Recompute import definitions for the newly focused file.
    pub async fn on_active_file_changed(&self, path: &str) -> Option<Arc<FileInfo>> {
        if !self.options.use_imports {
            return None;
        }
        let indexer = ImportDefinitionIndexer::new(
            Arc::clone(&self.files),
            self.navigator.clone(),
            Arc::clone(&self.parser),
            Arc::clone(&self.import_cache),
        );
        match indexer.refresh(path).await {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Import definitions for {path} unavailable: {e}");
                None
            }
        }
    }

    /// Drop everything cached for `path` after the host saw it change or close
    pub fn invalidate(&self, path: &str) {
        let had_imports = self.import_cache.invalidate(&path.to_string());
        let lookups = self.navigator.invalidate_file(path);
        log::debug!("Invalidated {path}: imports={had_imports}, lookups={lookups}");
    }

    pub async fn assemble_context(&self, request: &CompletionRequest) -> Result<AssembledContext> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let options = &self.options;
        let encoder = self.encoder.as_ref();

        let lines = split_lines(&request.contents);
        let query_window =
            extract_window(request.cursor, &lines, options.query_window_tokens, encoder);
        let visible_window = request.visible_window.clone().unwrap_or_else(|| {
            extract_window(request.cursor, &lines, options.visible_window_tokens, encoder)
        });
        let ctx = RetrievalContext {
            filepath: request.filepath.clone(),
            contents: request.contents.clone(),
            cursor: request.cursor,
            query_window,
        };

        let imports = ImportDefinitionRetriever::new(Arc::clone(&self.import_cache));
        let recently_edited = RecentlyEditedRetriever::new(Arc::clone(&self.editor));
        let similar_code = SimilarCodeRetriever::new(
            Arc::clone(&self.files),
            Arc::clone(&self.encoder),
            Arc::clone(options),
        )
        .with_chunk_store(self.chunk_store.clone());
        let similar_usage = SimilarUsageRetriever::new(
            Arc::clone(&self.files),
            self.navigator.clone(),
            Arc::clone(&self.parser),
            Arc::clone(options),
        );
        let diff = DiffRetriever::new(Arc::clone(&self.editor));
        let clipboard = ClipboardRetriever::new(Arc::clone(&self.editor));

        let timeouts = &options.timeouts;
        let (imports, recently_edited, similar_code, similar_usage, diff, clipboard) = tokio::join!(
            run_guarded(&imports, options.use_imports, timeouts.import_definitions_ms, &ctx),
            run_guarded(
                &recently_edited,
                options.use_recently_edited,
                timeouts.recently_edited_ms,
                &ctx,
            ),
            run_guarded(&similar_code, options.use_similar_code, timeouts.similar_code_ms, &ctx),
            run_guarded(
                &similar_usage,
                options.use_similar_usages,
                timeouts.similar_usage_ms,
                &ctx,
            ),
            run_guarded(&diff, options.use_diff, timeouts.diff_ms, &ctx),
            run_guarded(&clipboard, options.use_clipboard, timeouts.clipboard_ms, &ctx),
        );

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            log::debug!("Discarding generation {generation}, latest is {latest}");
            return Err(RetrievalError::Superseded { generation });
        }

        let candidates: Vec<Candidate> = [
            imports,
            recently_edited,
            similar_code,
            similar_usage,
            diff,
            clipboard,
        ]
        .into_iter()
        .flatten()
        .collect();
        let mut candidate_counts = BTreeMap::new();
        for candidate in &candidates {
            *candidate_counts.entry(candidate.origin).or_insert(0) += 1;
        }

        let budget = options.max_prompt_tokens.saturating_sub(encoder.count(&visible_window));
        let ranked = rank_snippets(&ctx.query_window, candidates, encoder);
        let filter = ValidityFilter::new(visible_window, Utc::now())
            .with_max_clipboard_age(options.max_clipboard_age())?;
        let packed = BudgetPacker::new(budget)
            .with_snippet_overhead(options.snippet_overhead_tokens)
            .pack(ranked, &filter, |text| encoder.count(text));

        log::debug!(
            "Assembled {} snippets ({} of {} tokens) for {}",
            packed.snippets.len(),
            packed.tokens_used,
            budget,
            request.filepath
        );

        Ok(AssembledContext {
            generation,
            budget,
            tokens_used: packed.tokens_used,
            candidate_counts,
            snippets: packed.snippets,
        })
    }
}
