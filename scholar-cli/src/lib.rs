//! # scholar-cli
//!
//! The `scholar` command: scan a folder of research papers, ingest them into
//! a local vector store and answer questions at an interactive prompt.

pub mod cli;
pub mod render;
pub mod repl;

use std::sync::Arc;

use anyhow::Result;
use scholar_rag::{
    LocalVectorStore, OllamaEmbeddingProvider, RagPipeline, discover_documents,
};
use tracing::info;

pub use cli::Args;
pub use repl::PromptInput;

/// Build the pipeline from `args`, ingest the document folder unless asked
/// not to, then run the prompt loop.
pub async fn run(args: Args) -> Result<()> {
    println!("\n=== Research Paper Analysis System ===\n");

    let config = args.rag_config()?;
    let provider = OllamaEmbeddingProvider::new(args.ollama_config())?;
    info!(model = provider.model(), endpoint = provider.endpoint(), "using Ollama embeddings");
    let store = LocalVectorStore::open(&args.store_dir)?;

    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(provider))
        .vector_store(Arc::new(store))
        .collection(args.collection.clone())
        .build()?;
    pipeline.create_collection().await?;

    if args.skip_ingest {
        let count = pipeline.count().await?;
        println!("Using {count} stored chunks from '{}'.", pipeline.collection());
    } else if !ingest(&pipeline, &args).await? {
        return Ok(());
    }

    repl::run(&pipeline).await
}

/// Scan and ingest the document folder. Returns `false` when it held nothing.
async fn ingest(pipeline: &RagPipeline, args: &Args) -> Result<bool> {
    println!("\nScanning for documents...");
    let paths = discover_documents(&args.docs_dir)?;
    if paths.is_empty() {
        println!("\nNo documents found in the reference folder.");
        println!("Please add your research papers to: {}", args.docs_dir.display());
        return Ok(false);
    }

    println!("\nFound {} documents to process.", paths.len());
    println!("\nProcessing documents and generating embeddings...");
    println!("This may take a while depending on the number and size of documents.");
    println!("Please wait...\n");

    let report = pipeline.ingest(&paths).await?;
    if report.skipped > 0 {
        println!("{} chunks could not be embedded and were skipped.", report.skipped);
    }
    println!("\nDocument processing completed! Stored {} chunks.", report.embedded);
    Ok(true)
}
