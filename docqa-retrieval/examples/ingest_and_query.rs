//! Ingest a small CSV upload and answer questions against it.
//!
//! ```sh
//! cargo run -p docqa-retrieval --example ingest_and_query
//! ```

use std::sync::Arc;

use docqa_retrieval::{
    InMemoryIndexStore, Retrieval, RetrievalConfig, RetrievalPipeline, SourceFormat,
};

const SALES_CSV: &[u8] = b"order_id,item,notes\n\
1001,Widget,Customer asked about the refund policy for damaged goods\n\
1002,Gadget,Shipped via express carrier on Tuesday\n\
1003,Sprocket,Gift wrap requested for delivery\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let config = RetrievalConfig::builder()
        .chunk_size(80)
        .chunk_overlap(16)
        .top_k(2)
        .build()?;
    let pipeline = RetrievalPipeline::builder()
        .config(config)
        .store(Arc::new(InMemoryIndexStore::new()))
        .build()?;

    let document = pipeline.ingest("sales", "sales.csv", SALES_CSV, SourceFormat::Csv).await?;
    println!("indexed {} into {} chunks", document.filename, document.chunks.len());

    for question in ["What is the refund policy?", "Is there a weather forecast?"] {
        println!("\nquestion: {question}");
        match pipeline.query("sales", question, None).await? {
            Retrieval::Relevant(chunks) => {
                for retrieved in &chunks {
                    println!("  [{:.3}] {}", retrieved.score, retrieved.chunk.text);
                }
            }
            Retrieval::NoRelevantContent => println!("  no relevant content"),
        }
    }

    Ok(())
}
