//! CLI entry point for the retrieval index.
//!
//! `index` builds the artifact offline, `search` and `info` read it back.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, anyhow};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use lookbook::display::{
    Status, THEME, create_build_table, create_info_table, create_progress_bar, with_spinner,
};
use lookbook::io::{ExitCode, JsonResponse, OutputFormat, ResponseMeta};
use lookbook::{
    FastEmbedGenerator, IndexArtifact, IndexBuilder, RetrievalError, RetrievalResult, Retriever,
    Settings, index_info,
};
use serde::Serialize;
use tracing::Level;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

/// Semantic search over a folder of text documents
#[derive(Parser)]
#[command(
    name = "lookbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Semantic search over a folder of text documents",
    long_about = "Embed a directory of text files once, then find the documents closest in meaning to a query.",
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Set up .lookbook directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    #[command(about = "Display active settings")]
    Config,

    #[command(
        about = "Embed the corpus and write the index",
        after_help = "Examples:\n  lookbook index\n  lookbook index ./catalog --output ./catalog_index"
    )]
    Index {
        /// Corpus directory (overrides corpus_dir)
        corpus_dir: Option<PathBuf>,

        /// Index directory (overrides index_path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output build statistics as JSON
        #[arg(long)]
        json: bool,
    },

    #[command(
        about = "Find the documents closest in meaning to a query",
        after_help = "Examples:\n  lookbook search \"crimson gown\"\n  lookbook search \"something for the office\" -k 5 --json\n\nJSON paths:\n  search   .data.results[]"
    )]
    Search {
        /// Query text
        query: String,

        /// Number of results (overrides search.default_limit)
        #[arg(short)]
        k: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Show a summary of the built index")]
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    k: usize,
    results: Vec<String>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!(
                "{}",
                THEME.status(Status::Failed, &format!("Configuration error: {e:#}"))
            );
            return ExitCode::ConfigError.into();
        }
    };

    init_tracing(&settings, cli.verbose);

    let code = match &cli.command {
        Commands::Init { force } => run_init(*force),
        Commands::Config => run_config(&settings),
        Commands::Index {
            corpus_dir,
            output,
            json,
        } => finish(
            run_index(&settings, corpus_dir.clone(), output.clone(), *json),
            OutputFormat::from_json_flag(*json),
        ),
        Commands::Search { query, k, json } => {
            let k = k.unwrap_or(settings.search.default_limit);
            finish(
                run_search(&settings, query, k, *json),
                OutputFormat::from_json_flag(*json),
            )
        }
        Commands::Info { json } => finish(
            run_info(&settings, *json),
            OutputFormat::from_json_flag(*json),
        ),
    };

    code.into()
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_from(path)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            if let Err(warning) = Settings::check_init() {
                if cli.verbose && !matches!(cli.command, Commands::Init { .. }) {
                    eprintln!(
                        "{}",
                        THEME.status(
                            Status::Notice,
                            &format!("{warning}. Using default configuration.")
                        )
                    );
                }
            }
            Settings::load().map_err(|e| anyhow!("{e}"))
        }
    }
}

/// Install the stderr subscriber. `--verbose` or `debug = true` wins over
/// `log_level`.
fn init_tracing(settings: &Settings, verbose: bool) {
    let level = if verbose || settings.debug {
        Level::DEBUG
    } else {
        Level::from_str(&settings.log_level).unwrap_or(Level::WARN)
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {e}");
    }
}

fn finish(result: RetrievalResult<()>, format: OutputFormat) -> ExitCode {
    let Err(error) = result else {
        return ExitCode::Success;
    };

    let code = ExitCode::from_error(&error);
    if format.is_json() {
        match serde_json::to_string_pretty(&JsonResponse::from_error(&error)) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{error} (and failed to encode JSON: {e})"),
        }
    } else {
        eprintln!(
            "{}",
            THEME.status(Status::Failed, &format!("{}: {error}", code.description()))
        );
        for suggestion in error.recovery_suggestions() {
            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
        }
    }
    code
}

fn print_json<T: Serialize>(response: &JsonResponse<T>) -> RetrievalResult<()> {
    let json = serde_json::to_string_pretty(response).map_err(|e| RetrievalError::Config {
        reason: format!("failed to encode JSON output: {e}"),
    })?;
    println!("{json}");
    Ok(())
}

fn run_init(force: bool) -> ExitCode {
    match Settings::init_config_file(force) {
        Ok(path) => {
            let verb = if force { "Wrote" } else { "Created" };
            println!(
                "{}",
                THEME.status(Status::Done, &format!(
                    "{verb} configuration file at: {}",
                    path.display()
                ))
            );
            println!("Edit this file to customize your settings.");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", THEME.status(Status::Failed, &e.to_string()));
            ExitCode::ConfigError
        }
    }
}

fn run_config(settings: &Settings) -> ExitCode {
    match toml::to_string_pretty(settings) {
        Ok(toml_str) => {
            println!("{}", THEME.apply(&THEME.header, "Current Configuration:"));
            println!("{}", "=".repeat(50));
            println!("{toml_str}");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error displaying config: {e}");
            ExitCode::GeneralError
        }
    }
}

fn run_index(
    settings: &Settings,
    corpus_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
) -> RetrievalResult<()> {
    settings.validate()?;
    let corpus_dir = corpus_dir.unwrap_or_else(|| settings.corpus_path());
    let index_dir = output.unwrap_or_else(|| settings.index_dir());

    let embedder = with_spinner("Loading embedding model...", || {
        FastEmbedGenerator::shared(&settings.semantic_search.model, &settings.model_options())
    })?;

    let progress = create_progress_bar(0, "embedding documents");
    let stats = IndexBuilder::new(embedder.as_ref())
        .with_extensions(&settings.corpus.extensions)
        .on_batch(|done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        })
        .build_and_persist(&corpus_dir, &index_dir);
    progress.finish_and_clear();
    let stats = stats?;

    if json {
        let meta = ResponseMeta::new(Some(stats.elapsed.as_millis() as u64));
        return print_json(&JsonResponse::success(&stats).with_meta(meta));
    }

    println!(
        "{}",
        THEME.status(Status::Done, &format!(
            "Indexed {} documents from {}",
            stats.documents_indexed,
            corpus_dir.display()
        ))
    );
    println!("{}", create_build_table(&stats));
    Ok(())
}

fn run_search(settings: &Settings, query: &str, k: usize, json: bool) -> RetrievalResult<()> {
    settings.validate()?;
    if k == 0 {
        return Err(RetrievalError::InvalidLimit { k });
    }

    // Report a missing index before paying for model initialization
    IndexArtifact::ensure_built(&settings.index_dir())?;

    let start = Instant::now();
    let retriever = with_spinner("Loading embedding model...", || {
        Retriever::from_settings(settings)
    })?;
    let results = retriever.search(query, k)?;

    if json {
        let meta = ResponseMeta::new(Some(start.elapsed().as_millis() as u64));
        let output = SearchOutput { query, k, results };
        return print_json(&JsonResponse::success(output).with_meta(meta));
    }

    if results.is_empty() {
        println!("{}", THEME.apply(&THEME.dim, "No documents in the index."));
        return Ok(());
    }

    for (i, text) in results.iter().enumerate() {
        println!("{}", THEME.ranked(i + 1, text));
    }
    Ok(())
}

fn run_info(settings: &Settings, json: bool) -> RetrievalResult<()> {
    let info = index_info(&settings.index_dir())?;

    if json {
        return print_json(&JsonResponse::success(&info));
    }

    println!("{}", THEME.apply(&THEME.header, "Index Summary"));
    println!("{}", create_info_table(&info));
    Ok(())
}
