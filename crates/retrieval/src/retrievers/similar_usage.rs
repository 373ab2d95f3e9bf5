use super::{RetrievalContext, Retriever};
use crate::config::AssemblyOptions;
use crate::error::Result;
use crate::host::{FileHost, Location, SymbolNavigator};
use async_trait::async_trait;
use context_code_window::{fixed_window, split_lines, Position};
use context_search::{Candidate, Snippet, SnippetOrigin};
use context_syntax::SyntaxParser;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A called symbol and the other places it is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolUsage {
    pub symbol: String,
    pub usages: Vec<Location>,
}

/// Code around other uses of whatever the cursor is calling.
///
/// For each call node enclosing the cursor the definition is resolved, its
/// references are listed, and a fixed-size window is cut around every
/// reference that is neither the definition nor the call itself.
pub struct SimilarUsageRetriever {
    files: Arc<dyn FileHost>,
    navigator: Arc<dyn SymbolNavigator>,
    parser: Arc<dyn SyntaxParser>,
    options: Arc<AssemblyOptions>,
}

fn callee_name(call_text: &str) -> String {
    call_text
        .split('(')
        .next()
        .unwrap_or(call_text)
        .trim()
        .to_string()
}

fn same_line(a: &Location, filepath: &str, line: usize) -> bool {
    a.filepath == filepath && a.range.start.line == line
}

impl SimilarUsageRetriever {
    pub fn new(
        files: Arc<dyn FileHost>,
        navigator: Arc<dyn SymbolNavigator>,
        parser: Arc<dyn SyntaxParser>,
        options: Arc<AssemblyOptions>,
    ) -> Self {
        Self {
            files,
            navigator,
            parser,
            options,
        }
    }

    /// Usages of every call enclosing the cursor, innermost call first
    pub async fn symbol_usages(&self, ctx: &RetrievalContext) -> Result<Vec<SymbolUsage>> {
        let Some(tree) = self.parser.parse(&ctx.filepath, &ctx.contents)? else {
            return Ok(Vec::new());
        };
        let offset = ctx
            .cursor
            .byte_offset(&ctx.contents)
            .unwrap_or(ctx.contents.len());

        let calls: Vec<(String, Position)> = tree
            .enclosing_node_path(offset)
            .into_iter()
            .filter(|node| node.is_call())
            .map(|node| (callee_name(tree.text(node)), node.start))
            .collect();

        let mut symbol_usages = Vec::with_capacity(calls.len());
        for (symbol, call_start) in calls {
            let definition = self.navigator.definition(&ctx.filepath, call_start).await?;
            let Some(definition) = definition else {
                log::debug!("No definition for {symbol}");
                continue;
            };
            // Queried at the end of the defined name
            let usages: Vec<Location> = self
                .navigator
                .references(&definition.filepath, definition.range.end)
                .await?
                .into_iter()
                .filter(|usage| {
                    !same_line(usage, &definition.filepath, definition.range.start.line)
                })
                .filter(|usage| !same_line(usage, &ctx.filepath, call_start.line))
                .collect();
            log::debug!("{symbol}: {} usages after self-filtering", usages.len());
            symbol_usages.push(SymbolUsage { symbol, usages });
        }
        Ok(symbol_usages)
    }
}

#[async_trait]
impl Retriever for SimilarUsageRetriever {
    fn name(&self) -> &'static str {
        "similar-usage"
    }

    async fn retrieve(&self, ctx: &RetrievalContext) -> Result<Vec<Candidate>> {
        let symbol_usages = self.symbol_usages(ctx).await?;
        if symbol_usages.iter().all(|su| su.usages.is_empty()) {
            return Ok(Vec::new());
        }

        let workspace_dirs = if self.options.only_my_code {
            Some(self.files.workspace_dirs().await?)
        } else {
            None
        };

        let mut file_cache: HashMap<String, String> = HashMap::new();
        let mut seen: HashSet<(String, usize)> = HashSet::new();
        let mut candidates = Vec::new();

        for usage in symbol_usages.into_iter().flat_map(|su| su.usages) {
            if let Some(dirs) = &workspace_dirs {
                if !dirs.iter().any(|dir| usage.filepath.starts_with(dir.as_str())) {
                    continue;
                }
            }
            if !seen.insert((usage.filepath.clone(), usage.range.start.line)) {
                continue;
            }

            if !file_cache.contains_key(&usage.filepath) {
                let text = if usage.filepath == ctx.filepath {
                    ctx.contents.clone()
                } else {
                    match self.files.read_file(&usage.filepath).await {
                        Ok(text) => text,
                        Err(e) => {
                            log::debug!("Skipping usage in {}: {e}", usage.filepath);
                            continue;
                        }
                    }
                };
                file_cache.insert(usage.filepath.clone(), text);
            }
            let Some(text) = file_cache.get(&usage.filepath) else {
                continue;
            };

            let lines = split_lines(text);
            let window = fixed_window(
                &usage.filepath,
                &lines,
                usage.range,
                self.options.usage_window_lines,
            );
            candidates.push(Candidate::new(
                SnippetOrigin::SimilarUsage,
                Snippet::code(usage.filepath, window.content),
            ));
        }
        Ok(candidates)
    }
}
