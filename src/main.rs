//! # Lectern — Retrieval-Augmented Study Assistant
//!
//! Ingest lecture notes into a local vector index and chat with a model
//! that cites them.
//!
//! Usage:
//!   lectern                          # Interactive chat (default)
//!   lectern ingest notes.txt         # Add a document to the index
//!   lectern search "gradient"        # Inspect what retrieval would return
//!   lectern serve --port 3000        # Web chat UI + JSON API

mod console;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use console::Console;
use lectern_agent::Agent;
use lectern_core::config::{self, LecternConfig};
use lectern_core::types::Message;
use lectern_index::{DocumentStore, IngestOptions};
use lectern_providers::EmbeddingClient;

#[derive(Parser)]
#[command(name = "lectern", version, about = "📚 Lectern — study assistant over your own documents")]
struct Cli {
    /// Path to config file (default: ~/.lectern/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat in the terminal (the default)
    Chat,
    /// Add a plain-text document to the index
    Ingest {
        /// File to ingest
        path: PathBuf,
        /// Title shown in citations (default: the file stem)
        #[arg(long)]
        title: Option<String>,
    },
    /// Query the index directly and show what retrieval would return
    Search {
        query: String,
        /// Number of results
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Start the web chat UI and JSON API
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "lectern=debug,tower_http=debug"
    } else {
        "lectern=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Pick up API keys from keys.env (working dir first, then ~/.lectern)
    config::load_env_file(Path::new("keys.env"));
    config::load_env_file(&LecternConfig::home_dir().join("keys.env"));

    let config = match &cli.config {
        Some(path) => LecternConfig::load_from(path)?,
        None => LecternConfig::load()?,
    };

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(config).await,
        Command::Ingest { path, title } => run_ingest(config, &path, title).await,
        Command::Search { query, top_k } => run_search(config, &query, top_k).await,
        Command::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            lectern_gateway::start(config).await
        }
    }
}

/// Interactive console loop. The conversation history lives here; a failed
/// turn is rolled back so a transient provider error does not poison it.
async fn run_chat(config: LecternConfig) -> Result<()> {
    let ui = Console::new();

    let mut agent = Agent::new(config.clone())?;
    match DocumentStore::open(config.index_path()) {
        Ok(store) => {
            if store.has_content() {
                let docs = store.documents();
                ui.info(&format!(
                    "Loaded {} section(s) from {} document(s).",
                    store.chunk_count(),
                    docs.len()
                ));
            } else {
                ui.info("The document index is empty. Add notes with `lectern ingest <file>`.");
            }
            agent.set_store(Arc::new(tokio::sync::Mutex::new(store)));
        }
        Err(e) => ui.error(&format!("Document index not available: {e}")),
    }

    ui.info(&format!(
        "Lectern is ready ({} / {}). Type 'exit' to quit.\n",
        agent.provider_name(),
        agent.model_name()
    ));

    let mut history: Vec<Message> = Vec::new();
    loop {
        let Some(input) = ui.read_user_input() else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            ui.info("Goodbye!");
            break;
        }

        history.push(Message::user(&input));
        match agent.generate_response(&history).await {
            Ok(reply) => {
                history.push(Message::assistant(&reply));
                ui.bot_reply(&reply);
            }
            Err(e) => {
                ui.error(&e.to_string());
                history.pop();
            }
        }
    }
    Ok(())
}

async fn run_ingest(config: LecternConfig, path: &Path, title: Option<String>) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;

    let mut store = DocumentStore::open(config.index_path())?;
    let embedder = EmbeddingClient::new(&config.embedding, &config.api_key)?;
    let opts = IngestOptions {
        title,
        source: Some(path.display().to_string()),
        chunk_size: config.retrieval.chunk_size,
        chunk_overlap: config.retrieval.chunk_overlap,
    };

    let meta = store.ingest(&text, &embedder, &opts).await?;
    println!(
        "✅ Ingested '{}' — {} chunk(s) indexed at {}",
        meta.title,
        meta.chunk_count,
        config.index_path().display()
    );
    Ok(())
}

async fn run_search(config: LecternConfig, query: &str, top_k: Option<usize>) -> Result<()> {
    let store = DocumentStore::open(config.index_path())?;
    if !store.has_content() {
        println!("The document index is empty. Add notes with `lectern ingest <file>`.");
        return Ok(());
    }

    let embedder = EmbeddingClient::new(&config.embedding, &config.api_key)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let results = store.search(query, &embedder, top_k).await?;

    if results.is_empty() {
        println!("No matching sections found.");
        return Ok(());
    }
    for (rank, result) in results.iter().enumerate() {
        let snippet: String = result.chunk.text.chars().take(160).collect();
        println!(
            "{}. [{:.3}] {} (section {})\n   {snippet}…\n",
            rank + 1,
            result.score,
            result.chunk.document_title,
            result.chunk.index + 1
        );
    }
    Ok(())
}
