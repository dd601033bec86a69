//! Lumen CLI - Command-line interface
//!
//! Usage:
//!   lumen ingest <files>...
//!   lumen search --doc <file>... <query>
//!   lumen query --doc <file>... <question>
//!
//! Every invocation builds a fresh in-memory store from the given files.
//!
//! Author: hephaex@gmail.com

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lumen_core::{logging::init_tracing, AppConfig, Document, FileType, SearchHit};
use lumen_rag::{
    citation_source, CitationSource, DocumentLibrary, DocumentUpload, PlaceholderCitations,
    QueryOutcome, QueryRanker, RankerConfig,
};
use lumen_vector::{InMemoryVectorStore, VectorStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Characters of matched text shown per result
const SNIPPET_CHARS: usize = 200;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Document similarity search and query CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load documents and report how they were stored
    Ingest {
        /// Files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Rank stored vectors against a query
    Search {
        /// Documents to search
        #[arg(long = "doc", required = true)]
        docs: Vec<PathBuf>,

        /// Query text
        query: String,

        /// Maximum number of hits
        #[arg(long)]
        top_k: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Answer a question from the given documents
    Query {
        /// Documents to query
        #[arg(long = "doc", required = true)]
        docs: Vec<PathBuf>,

        /// Question to ask
        question: String,

        /// Maximum number of documents to answer from
        #[arg(long)]
        top_k: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Use random page/paragraph labels
        #[arg(long)]
        placeholder_citations: bool,

        /// Seed for placeholder citations
        #[arg(long, requires = "placeholder_citations")]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    // keep stderr quiet unless asked
    config.logging.level = if cli.verbose { "debug" } else { "warn" }.to_string();
    init_tracing(&config.logging, "")?;

    let store = Arc::new(InMemoryVectorStore::from_config(&config.chunking));
    let library = DocumentLibrary::new(store.clone());

    match cli.command {
        Commands::Ingest { files } => {
            let documents = ingest_files(&library, &files).await?;
            for document in &documents {
                let chunks = store.chunk_count(&document.id).await.unwrap_or(0);
                println!(
                    "{}  {}  {}  pages={}  chunks={}  vectorized={}",
                    document.id,
                    document.display_name(),
                    document.file_type,
                    document.pages,
                    chunks,
                    document.vectorized
                );
            }
            let stats = store.stats().await;
            println!(
                "{} documents, {} chunks, {} vectors",
                stats.documents, stats.chunks, stats.vectors
            );
        }
        Commands::Search {
            docs,
            query,
            top_k,
            json,
        } => {
            ingest_files(&library, &docs).await?;
            let limit = top_k.unwrap_or(config.search.default_top_k);
            let hits = store.search(&query, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No matching documents.");
            } else {
                print_hits(&hits);
            }
        }
        Commands::Query {
            docs,
            question,
            top_k,
            json,
            placeholder_citations,
            seed,
        } => {
            ingest_files(&library, &docs).await?;

            let ranker_config = RankerConfig::from(&config);
            let citations: Arc<dyn CitationSource> = if placeholder_citations {
                match seed {
                    Some(seed) => Arc::new(PlaceholderCitations::seeded(seed)),
                    None => Arc::new(PlaceholderCitations::from_entropy()),
                }
            } else {
                citation_source(config.search.citation_mode, ranker_config.chunk_stride)
            };

            let ranker = QueryRanker::new(store.clone(), ranker_config).with_citations(citations);
            let outcome = ranker.rank(&question, top_k).await?;

            if json {
                let status = match &outcome {
                    QueryOutcome::Answered(_) => "answered",
                    QueryOutcome::NoMatches => "no_results",
                    QueryOutcome::Unavailable => "unavailable",
                };
                let body = json!({
                    "query": question,
                    "status": status,
                    "results": outcome.results(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            match outcome {
                QueryOutcome::Answered(results) => {
                    for (rank, result) in results.iter().enumerate() {
                        println!(
                            "{}. {} ({}) score {:.4}",
                            rank + 1,
                            result.document_name,
                            result.citation,
                            result.score
                        );
                        println!("   {}", snippet(&result.answer, SNIPPET_CHARS));
                    }
                }
                QueryOutcome::NoMatches => println!("No matching documents."),
                QueryOutcome::Unavailable => bail!("Vector store is unavailable"),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Build an upload from a file on disk; only text files are read
async fn read_upload(path: &Path) -> anyhow::Result<DocumentUpload> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?
        .to_string();

    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut upload = DocumentUpload::new(filename.as_str()).with_size(metadata.len());

    if FileType::from_filename(&filename).is_text() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        upload = upload.with_content(content);
    } else {
        tracing::warn!(file = %path.display(), "Not a text file, stored without content");
    }

    Ok(upload)
}

async fn ingest_files(library: &DocumentLibrary, paths: &[PathBuf]) -> anyhow::Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let upload = read_upload(path).await?;
        documents.push(library.upload(upload).await?);
    }
    Ok(documents)
}

fn print_hits(hits: &[SearchHit]) {
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} [{}] score {:.4}",
            rank + 1,
            hit.id,
            lumen_core::display_name(&hit.metadata.filename, &hit.document_id),
            hit.score
        );
        println!("   {}", snippet(&hit.content, SNIPPET_CHARS));
    }
}

/// First `max_chars` characters on one line
fn snippet(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}...")
}
