//! `tutor`: ingest a textbook PDF and answer questions grounded in it.
//!
//! # Usage
//!
//! ```bash
//! # Offline ingestion with the local embedder
//! tutor ingest --pdf-path data/Python_Programming.pdf --embed-model models/all-MiniLM-L6-v2
//!
//! # Ingestion with Gemini embeddings
//! GEMINI_API_KEY=xxx tutor ingest --embedder gemini
//!
//! # One question, then a chat session
//! GEMINI_API_KEY=xxx tutor ask "What is a dictionary?"
//! GEMINI_API_KEY=xxx tutor chat --reject-out-of-domain
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tutor::gemini::{DEFAULT_MODEL, GeminiBackend};
use tutor::ort::OrtEmbedding;
use tutor::rag::{ArtifactStore, IndexBuilder, RagConfig};
use tutor::{DomainPolicy, Tutor};
use tutor_cli::{Embedder, EmbedderKind};

/// Textbook tutor: retrieval-augmented answers from your PDF.
#[derive(Parser, Debug)]
#[command(name = "tutor", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, embed and index a PDF, then write both artifacts.
    Ingest(IngestArgs),
    /// Answer a single question.
    Ask {
        /// The question to answer.
        question: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Answer questions read line by line from stdin.
    Chat(QueryArgs),
}

#[derive(clap::Args, Debug)]
struct EmbedderArgs {
    /// Embedding backend (ort, gemini).
    #[arg(long, env = "TUTOR_EMBEDDER", default_value_t = EmbedderKind::Ort)]
    embedder: EmbedderKind,

    /// ONNX model directory for the ort backend.
    #[arg(long, env = "TUTOR_EMBED_MODEL", default_value = "models/all-MiniLM-L6-v2")]
    embed_model: PathBuf,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl EmbedderArgs {
    fn api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .context("Set GEMINI_API_KEY in your environment or pass --api-key")
    }

    fn build(&self) -> Result<Embedder> {
        let embedder = match self.embedder {
            EmbedderKind::Ort => Embedder::from(
                OrtEmbedding::from_directory(&self.embed_model).with_context(|| {
                    format!("failed to load ONNX model from {}", self.embed_model.display())
                })?,
            ),
            EmbedderKind::Gemini => Embedder::from(GeminiBackend::new(self.api_key()?)),
        };
        tracing::info!(
            backend = %self.embedder,
            model = tutor::EmbeddingModel::model_id(&embedder),
            "embedder ready"
        );
        Ok(embedder)
    }
}

#[derive(clap::Args, Debug)]
struct IngestArgs {
    /// Textbook PDF to ingest.
    #[arg(long, env = "TUTOR_PDF_PATH", default_value = "data/Python_Programming.pdf")]
    pdf_path: PathBuf,

    /// Where to write the vector artifact.
    #[arg(long, env = "TUTOR_INDEX_PATH", default_value = "output/textbook_index.rkyv")]
    output_index: PathBuf,

    /// Where to write the chunk artifact.
    #[arg(long, env = "TUTOR_CHUNKS_PATH", default_value = "output/text_chunks.json")]
    output_chunks: PathBuf,

    /// Maximum characters per chunk.
    #[arg(long, env = "TUTOR_MAX_CHUNK_SIZE", default_value_t = 1000)]
    max_chunk_size: usize,

    #[command(flatten)]
    embedder: EmbedderArgs,
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Vector artifact written by `tutor ingest`.
    #[arg(long, env = "TUTOR_INDEX_PATH", default_value = "output/textbook_index.rkyv")]
    index: PathBuf,

    /// Chunk artifact written by `tutor ingest`.
    #[arg(long, env = "TUTOR_CHUNKS_PATH", default_value = "output/text_chunks.json")]
    chunks: PathBuf,

    /// Gemini model that writes the answers.
    #[arg(short, long, env = "TUTOR_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Number of textbook chunks retrieved per question.
    #[arg(long, default_value_t = 3)]
    top_k: usize,

    /// Minimum similarity for a chunk to be used as context.
    #[arg(long, default_value_t = 0.5)]
    min_similarity: f32,

    /// Refuse questions outside the textbook's domain.
    #[arg(long)]
    reject_out_of_domain: bool,

    #[command(flatten)]
    embedder: EmbedderArgs,
}

impl QueryArgs {
    const fn policy(&self) -> DomainPolicy {
        if self.reject_out_of_domain {
            DomainPolicy::Reject
        } else {
            DomainPolicy::Advisory
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let result = match args.command {
        Command::Ingest(ingest_args) => ingest(ingest_args).await,
        Command::Ask { question, query } => ask(&query, &question).await,
        Command::Chat(query) => chat(&query).await,
    };

    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}

async fn ingest(args: IngestArgs) -> Result<()> {
    let embedder = Arc::new(args.embedder.build()?);
    let builder = IndexBuilder::new(embedder, args.max_chunk_size)?;

    let knowledge = builder
        .build_with_progress(&args.pdf_path, |progress| {
            tracing::debug!(
                stage = ?progress.stage,
                processed = progress.processed,
                total = progress.total,
                "ingestion progress"
            );
        })
        .await
        .with_context(|| format!("failed to ingest {}", args.pdf_path.display()))?;

    ArtifactStore::new(&args.output_index, &args.output_chunks)
        .save(&knowledge)
        .context("failed to write index artifacts")?;

    tracing::info!(
        chunks = knowledge.len(),
        index = %args.output_index.display(),
        chunks_file = %args.output_chunks.display(),
        "ingestion complete"
    );
    Ok(())
}

fn load_tutor(args: &QueryArgs) -> Result<Tutor<Embedder, GeminiBackend>> {
    let api_key = args.embedder.api_key()?;
    let embedder = Arc::new(args.embedder.build()?);

    let knowledge = ArtifactStore::new(&args.index, &args.chunks)
        .load(embedder.as_ref())
        .context("failed to load the knowledge base (run `tutor ingest` first)")?;

    let model = GeminiBackend::new(api_key).with_text_model(&args.model);
    let config = RagConfig::builder()
        .top_k(args.top_k)
        .min_similarity(args.min_similarity)
        .build();

    Ok(Tutor::builder(embedder, Arc::new(knowledge), Arc::new(model))
        .config(config)
        .policy(args.policy())
        .build()?)
}

async fn ask(args: &QueryArgs, question: &str) -> Result<()> {
    let tutor = load_tutor(args)?;
    println!("{}", tutor.answer(question).await);
    Ok(())
}

async fn chat(args: &QueryArgs) -> Result<()> {
    let tutor = load_tutor(args)?;
    println!("Textbook tutor. Ask a question, or type `exit` to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        println!("{}\n", tutor.answer(question).await);
    }
    Ok(())
}
