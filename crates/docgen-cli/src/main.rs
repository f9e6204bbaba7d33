use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use docgen_ai::{DocumentRequest, GeneratedDocument, EMPTY_DESCRIPTION_MESSAGE};
use docgen_api::{AppState, Server};
use docgen_core::{ConfigManager, DocGenConfig, DocumentType, LoggingConfig};
use docgen_export::save_to_word;
use docgen_vector::{EmbeddingProviderFactory, IndexStats, Indexer};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "docgen")]
#[command(about = "Generate FRS and design documents from a corpus of past PDFs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./.docgen.toml, then ~/.docgen/config.toml)
    #[arg(short, long, global = true, env = "DOCGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or load the index and start the web UI
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Index the PDF corpus and print statistics
    Index,

    /// Generate one document and write it as .docx
    Generate {
        /// Document type
        #[arg(short = 't', long = "type", value_enum, default_value = "frs")]
        doc_type: DocTypeArg,

        /// Project description
        #[arg(short, long, conflicts_with = "description_file")]
        description: Option<String>,

        /// Read the project description from a file
        #[arg(long)]
        description_file: Option<PathBuf>,

        /// Output path (defaults to export.output_dir/export.file_name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocTypeArg {
    Frs,
    Design,
}

impl From<DocTypeArg> for DocumentType {
    fn from(arg: DocTypeArg) -> Self {
        match arg {
            DocTypeArg::Frs => DocumentType::Frs,
            DocTypeArg::Design => DocumentType::DesignDocument,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = load_config(cli.config.as_deref(), cli.verbose)?;

    init_tracing(&manager.config().logging, cli.verbose);

    match execute_command(cli.command, manager).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Configuration is read before the logging settings are known, so its
/// messages go through a temporary subscriber.
fn load_config(path: Option<&Path>, verbose: bool) -> Result<ConfigManager> {
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" })),
        )
        .finish();

    tracing::subscriber::with_default(bootstrap, || match path {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::load(),
    })
    .context("Failed to load configuration")
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},tower_http={level},hyper=warn,reqwest=warn,lopdf=error"
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("compact") {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn execute_command(command: Commands, manager: ConfigManager) -> Result<()> {
    match command {
        Commands::Serve { host, port } => {
            let mut config = manager.into_config();
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Index => index(manager.into_config()).await,
        Commands::Generate {
            doc_type,
            description,
            description_file,
            output,
        } => {
            let description = resolve_description(description, description_file)?;
            generate(manager.into_config(), doc_type.into(), description, output).await
        }
        Commands::Config => {
            if let Some(path) = manager.config_path() {
                println!("{} {}", "# Loaded from".dimmed(), path.display().to_string().dimmed());
            }
            println!("{}", manager.to_toml()?);
            Ok(())
        }
    }
}

/// The description text from the flag or file; blank text is rejected
/// before any model is contacted.
fn resolve_description(description: Option<String>, file: Option<PathBuf>) -> Result<String> {
    let description = match (description, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("Provide --description or --description-file"),
    };

    if description.trim().is_empty() {
        bail!(EMPTY_DESCRIPTION_MESSAGE);
    }
    Ok(description)
}

async fn serve(config: DocGenConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;

    println!(
        "{} http://{}",
        "DocGen is running at".green().bold(),
        addr.to_string().cyan()
    );
    Server::new(addr, state).run().await?;
    Ok(())
}

async fn index(config: DocGenConfig) -> Result<()> {
    let embedder = EmbeddingProviderFactory::create(&config.embedding)?;
    let indexer = Indexer::new(config.clone(), embedder);

    let (_, stats) = if config.index.cache_path.is_some() {
        indexer.rebuild().await?
    } else {
        indexer.build().await?
    };

    print_stats(&config, &stats);
    Ok(())
}

async fn generate(
    config: DocGenConfig,
    doc_type: DocumentType,
    description: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let output =
        output.unwrap_or_else(|| config.export.output_dir.join(&config.export.file_name));

    let state = AppState::new(config)
        .await
        .context("Failed to initialize generation pipeline")?;

    let document = state
        .chain
        .generate(&DocumentRequest {
            doc_type,
            project_description: description,
        })
        .await?;

    print_document(&document);

    save_to_word(document.title(), &document.content, &output)?;
    println!(
        "\n{} {}",
        "Saved".green().bold(),
        output.display().to_string().cyan()
    );
    Ok(())
}

fn print_stats(config: &DocGenConfig, stats: &IndexStats) {
    let row = |key: &str, value: String| println!("{}: {}", key.cyan().bold(), value.yellow());

    println!("{}", "Index built".green().bold());
    row("pdf_dir", config.corpus.pdf_dir.display().to_string());
    row("files", stats.files.to_string());
    row("files_skipped", stats.files_skipped.to_string());
    row("pages", stats.pages.to_string());
    row("chunks", stats.chunks.to_string());
    row(
        "dimension",
        stats
            .dimension
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    row("elapsed_ms", stats.elapsed_ms.to_string());
    if let Some(path) = &config.index.cache_path {
        row("snapshot", path.display().to_string());
    }
}

fn print_document(document: &GeneratedDocument) {
    println!(
        "{} {}\n",
        document.doc_type.label().green().bold(),
        "Generated!".green().bold()
    );
    println!("{}", document.content);

    if !document.sources.is_empty() {
        println!("\n{}", "Context sources:".cyan().bold());
        for source in &document.sources {
            println!(
                "  {} (page {}, distance {:.4})",
                source.source, source.page, source.distance
            );
        }
    }
}
