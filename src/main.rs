// file: src/main.rs
// description: commandline application entry point with command handling

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use doc_chat::utils::logging::{
    format_error, format_info, format_success, format_timing, format_warning,
};
use doc_chat::{
    ChatEngine, Config, IngestPipeline, LanceDbClient, OperationTimer, PerformanceMetrics,
    SchemaManager, Validator,
};
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "doc_chat")]
#[command(version = "0.1.0")]
#[command(about = "Local document chatbot with RAG over LanceDB and Ollama", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, chunk, embed, and store documents (PDF, TXT, MD)
    Ingest {
        /// Files or directories to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        force: bool,
    },

    /// Ask a single question over the ingested documents
    Ask {
        question: String,

        /// Number of source chunks to retrieve
        #[arg(short = 'k', long, default_value_t = 3)]
        sources: usize,
    },

    /// Interactive question-answering session
    Chat {
        #[arg(short = 'k', long, default_value_t = 3)]
        sources: usize,
    },

    /// Search for chunks by semantic similarity without generating an answer
    Search {
        query: String,

        #[arg(short = 'k', long, default_value_t = 5)]
        limit: usize,

        /// Restrict results to a single source file
        #[arg(long)]
        source: Option<String>,
    },

    /// Remove all chunks ingested from one source file
    Remove {
        /// Source file name as shown in search results
        source: String,
    },

    Stats,

    /// Check database, Ollama, and model availability
    Verify,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    doc_chat::utils::logging::init_logger(cli.color, cli.verbose);

    let config = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Ingest { paths, force } => {
            cmd_ingest(&config, &paths, force).await?;
        }
        Commands::Ask { question, sources } => {
            cmd_ask(&config, &question, sources).await?;
        }
        Commands::Chat { sources } => {
            cmd_chat(&config, sources).await?;
        }
        Commands::Search {
            query,
            limit,
            source,
        } => {
            cmd_search(&config, &query, limit, source.as_deref()).await?;
        }
        Commands::Remove { source } => {
            cmd_remove(&config, &source).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Verify => {
            cmd_verify(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

async fn cmd_ingest(config: &Config, paths: &[PathBuf], force: bool) -> Result<()> {
    info!("Starting document ingestion");

    let pipeline = IngestPipeline::new(config.clone())
        .await
        .context("Failed to initialize ingestion pipeline")?;

    if !pipeline.client().ping().await? {
        error!("Cannot connect to LanceDB");
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    let report = pipeline
        .run(paths, force)
        .await
        .context("Ingestion failed")?;

    if report.files_failed > 0 {
        println!(
            "{}",
            format_warning(&format!("{} files failed to ingest", report.files_failed))
        );
    }

    println!(
        "{}",
        format_success(&format!(
            "Ingested {} files ({} chunks, {} total in database)",
            report.files_processed, report.chunks_created, report.db_chunk_count
        ))
    );
    println!("  {}", format_timing("Embedding", report.embedding_time_ms));
    println!("  {}", format_timing("Storage", report.storage_time_ms));
    println!("  {}", format_timing("Total", report.total_time_ms));

    if report.chunks_created > 0 {
        let metrics = PerformanceMetrics::new(
            "embedding",
            report.chunks_created,
            Duration::from_millis(report.embedding_time_ms),
        );
        info!("{}", metrics.format());
    }

    Ok(())
}

async fn cmd_ask(config: &Config, question: &str, sources: usize) -> Result<()> {
    Validator::validate_question(question)?;
    Validator::validate_top_k(sources)?;

    let engine = ChatEngine::new(config.clone())
        .await
        .context("Failed to initialize chat engine")?;

    let answer = engine.ask(question, sources).await.context("Query failed")?;
    print_answer(&answer);

    Ok(())
}

async fn cmd_chat(config: &Config, sources: usize) -> Result<()> {
    Validator::validate_top_k(sources)?;

    let engine = ChatEngine::new(config.clone())
        .await
        .context("Failed to initialize chat engine")?;

    match engine.chat_model_available().await {
        Ok(true) => {}
        Ok(false) => {
            println!(
                "{}",
                format_warning(&format!(
                    "Model '{}' is not available in Ollama. Pull it with: ollama pull {}",
                    config.ollama.chat_model, config.ollama.chat_model
                ))
            );
        }
        Err(e) => {
            println!(
                "{}",
                format_error(&format!("Cannot reach Ollama at {}: {}", config.ollama.base_url, e))
            );
            return Ok(());
        }
    }

    println!(
        "{}",
        format_info("Interactive chat started. Type 'exit' or 'quit' to leave.")
    );

    let stdin = std::io::stdin();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match engine.ask(question, sources).await {
            Ok(answer) => print_answer(&answer),
            Err(e) => println!("{}", format_error(&format!("Query failed: {}", e))),
        }
    }

    println!("{}", format_info("Goodbye"));
    Ok(())
}

fn print_answer(answer: &doc_chat::Answer) {
    println!("\n{}\n", answer.text);

    if answer.has_sources() {
        println!("Sources:");
        for (idx, source) in answer.sources.iter().enumerate() {
            println!(
                "  {}. {} (chunk {}, {:.1}% similar)",
                idx + 1,
                source.source_file,
                source.chunk_index,
                source.similarity_percent()
            );
            println!("     {}", Validator::truncate_text(&source.content, 150));
        }
        println!();
    }

    println!(
        "  {} | {} | {}",
        format_timing("Retrieval", answer.retrieval_time_ms),
        format_timing("Generation", answer.generation_time_ms),
        format_timing("Total", answer.total_time_ms())
    );
}

async fn cmd_search(
    config: &Config,
    query: &str,
    limit: usize,
    source_filter: Option<&str>,
) -> Result<()> {
    Validator::validate_question(query)?;
    Validator::validate_top_k(limit)?;

    let engine = ChatEngine::new(config.clone())
        .await
        .context("Failed to initialize chat engine")?;

    let results = if let Some(source) = source_filter {
        let embedding = engine.embed_query(query).await;
        engine
            .database()
            .vector_search(embedding, limit, Some(source))
            .await?
    } else {
        engine.search(query, limit).await?
    };

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Removing the source filter");
        println!("  - Checking that documents have been ingested");
        return Ok(());
    }

    println!("\nSearch Results for: \"{}\"\n", query);
    println!("Found {} result(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, result) in results.iter().enumerate() {
        println!("\n{}. {}", idx + 1, result.format_summary(300));

        if let Some(distance) = result.distance {
            println!("   Distance: {:.4}", distance);
        }
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

async fn cmd_remove(config: &Config, source: &str) -> Result<()> {
    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    let before = client.chunk_count().await?;
    client
        .delete_by_source(source)
        .await
        .context("Failed to delete chunks")?;
    let after = client.chunk_count().await?;

    if before == after {
        println!(
            "{}",
            format_warning(&format!("No chunks found for source '{}'", source))
        );
    } else {
        println!(
            "{}",
            format_success(&format!(
                "Removed {} chunks from '{}' ({} remaining)",
                before - after,
                source,
                after
            ))
        );
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    if !client.ping().await? {
        error!("Cannot connect to LanceDB");
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    let chunk_count = client.chunk_count().await?;

    println!("Database: {}", client.uri());
    println!("Table: {}", client.table_name());
    println!("Total chunks: {}", chunk_count);
    println!("Chat model: {}", config.ollama.chat_model);
    println!(
        "Embedding model: {} ({} dimensions)",
        config.ollama.embedding_model, config.ollama.embedding_dim
    );

    Ok(())
}

async fn cmd_verify(config: &Config) -> Result<()> {
    info!("Verifying system health");

    let engine = ChatEngine::new(config.clone())
        .await
        .context("Failed to initialize chat engine")?;

    let report = engine.health_report().await;
    println!("{}", report.format());

    let schema_manager = SchemaManager::new(engine.database());
    if schema_manager.verify_schema().await? {
        println!("{}", format_success("Chunks table exists"));
    } else {
        println!(
            "{}",
            format_info("Chunks table will be created on first ingest")
        );
    }

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete all ingested documents. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting database - all data will be lost");
    let timer = OperationTimer::new("database reset");

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    let schema_manager = SchemaManager::new(&client);
    schema_manager
        .drop_all_tables()
        .await
        .context("Failed to drop tables")?;

    schema_manager
        .initialize()
        .await
        .context("Failed to reinitialize schema")?;

    timer.finish();

    println!("{}", format_success("Database reset complete"));

    Ok(())
}
