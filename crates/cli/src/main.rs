use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use context_cli::{GitEditor, LocalHost, NullNavigator};
use context_code_window::Position;
use context_retrieval::{load_options, AssemblyOptions, CompletionRequest, ContextAssembler};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "context-assemble")]
#[command(about = "Assemble completion context for a cursor position", long_about = None)]
#[command(version)]
struct Cli {
    /// File being edited
    #[arg(long)]
    file: PathBuf,

    /// Cursor line (zero-based)
    #[arg(long, default_value_t = 0)]
    line: usize,

    /// Cursor column in characters (zero-based)
    #[arg(long, default_value_t = 0)]
    column: usize,

    /// Workspace root; candidates are drawn from files under it
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// TOML file with assembly options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override max_prompt_tokens
    #[arg(long)]
    budget: Option<usize>,

    /// tokenizer.json used to count tokens
    #[cfg(feature = "hf-tokenizer")]
    #[arg(long)]
    tokenizer: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn options(cli: &Cli) -> Result<AssemblyOptions> {
    let mut options = match &cli.config {
        Some(path) => load_options(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AssemblyOptions::default(),
    };
    if let Some(budget) = cli.budget {
        options.max_prompt_tokens = budget;
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let workspace = tokio::fs::canonicalize(&cli.workspace)
        .await
        .with_context(|| format!("Workspace {} not found", cli.workspace.display()))?;
    let file = tokio::fs::canonicalize(&cli.file)
        .await
        .with_context(|| format!("File {} not found", cli.file.display()))?;
    let filepath = file.to_string_lossy().into_owned();
    let contents = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {filepath}"))?;

    let assembler = ContextAssembler::new(
        options(&cli)?,
        Arc::new(LocalHost::new(&workspace)),
        Arc::new(NullNavigator),
        Arc::new(GitEditor::new(&workspace)),
    )
    .context("Invalid assembly options")?;

    #[cfg(feature = "hf-tokenizer")]
    let assembler = match &cli.tokenizer {
        Some(path) => assembler.with_encoder(Arc::new(context_cli::HfEncoder::from_file(path)?)),
        None => assembler,
    };

    assembler.on_active_file_changed(&filepath).await;

    let request = CompletionRequest::new(filepath, contents, Position::new(cli.line, cli.column));
    let context = assembler
        .assemble_context(&request)
        .await
        .context("Context assembly failed")?;

    log::info!(
        "{} snippets, {} of {} tokens",
        context.len(),
        context.tokens_used,
        context.budget
    );
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}
