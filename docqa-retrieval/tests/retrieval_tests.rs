//! End-to-end pipeline tests: ingest raw bytes, query, inspect outcomes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docqa_retrieval::{
    DocumentIndex, ExtractError, InMemoryIndexStore, IndexStore, Result, RetrievalConfig,
    RetrievalError, RetrievalPipeline, Retriever, SourceFormat, StoreStats,
};
use tokio::sync::{Semaphore, mpsc};

const SALES_CSV: &[u8] = b"order_id,item,notes\n\
1001,Widget,Customer asked about the refund policy for damaged goods\n\
1002,Gadget,Shipped via express carrier on Tuesday\n\
1003,Sprocket,Gift wrap requested for delivery\n";

fn pipeline_with(config: RetrievalConfig) -> RetrievalPipeline {
    RetrievalPipeline::builder()
        .config(config)
        .store(Arc::new(InMemoryIndexStore::new()))
        .build()
        .unwrap()
}

fn pipeline() -> RetrievalPipeline {
    pipeline_with(RetrievalConfig::default())
}

#[tokio::test]
async fn csv_upload_answers_a_refund_question() {
    let config = RetrievalConfig::builder()
        .chunk_size(80)
        .chunk_overlap(16)
        .top_k(1)
        .build()
        .unwrap();
    let pipeline = pipeline_with(config);

    let document = pipeline
        .ingest("sales", "sales.csv", SALES_CSV, SourceFormat::Csv)
        .await
        .unwrap();
    assert!(document.chunks.len() > 1);

    let result = pipeline.query("sales", "refund policy", None).await.unwrap();
    assert!(result.is_relevant());
    assert_eq!(result.chunks().len(), 1);
    assert!(result.chunks()[0].chunk.text.contains("refund"));
}

#[tokio::test]
async fn query_with_no_vocabulary_overlap_reports_no_relevant_content() {
    let pipeline = pipeline();
    pipeline.ingest("sales", "sales.csv", SALES_CSV, SourceFormat::Csv).await.unwrap();

    let result = pipeline.query("sales", "xylophone zqwv", None).await.unwrap();
    assert!(!result.is_relevant());
    assert_eq!(result.context_text(), "");
}

#[tokio::test]
async fn zero_top_k_is_rejected_at_query_time() {
    let pipeline = pipeline();
    pipeline.index_text("doc", "doc.txt", "refund notes").await.unwrap();

    let err = pipeline.query("doc", "refund", Some(0)).await.unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidChunkConfig(_)));
}

#[tokio::test]
async fn documents_are_searched_in_isolation() {
    let pipeline = pipeline();
    pipeline
        .index_text("returns", "returns.txt", "the refund window lasts thirty days")
        .await
        .unwrap();
    pipeline
        .index_text("logistics", "logistics.txt", "packages ship with express carriers")
        .await
        .unwrap();

    let result = pipeline.query("returns", "express", None).await.unwrap();
    assert!(!result.is_relevant());

    let result = pipeline.query("logistics", "express", None).await.unwrap();
    assert!(result.is_relevant());
}

#[tokio::test]
async fn empty_upload_is_rejected_before_indexing() {
    let pipeline = pipeline();
    let err = pipeline.ingest("empty", "empty.csv", b"", SourceFormat::Csv).await.unwrap_err();

    assert!(matches!(err, RetrievalError::ExtractError(ExtractError::EmptyContent)));
    assert!(!pipeline.store().contains("empty").await.unwrap());
}

#[tokio::test]
async fn tagged_ingest_resolves_extensions_and_rejects_unknown_ones() {
    let pipeline = pipeline();
    pipeline
        .ingest_tagged("notes", "notes.txt", b"Plain refund notes.", "txt")
        .await
        .unwrap();
    assert!(pipeline.query("notes", "refund", None).await.unwrap().is_relevant());

    let err = pipeline.ingest_tagged("bad", "file.odt", b"data", "odt").await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::ExtractError(ExtractError::UnsupportedFormat { .. })
    ));
}

#[tokio::test]
async fn serialized_index_answers_queries_identically() {
    let pipeline = pipeline();
    pipeline
        .index_text(
            "doc",
            "doc.txt",
            "Refunds are processed within thirty days of purchase. \
             Shipping is free above fifty dollars.",
        )
        .await
        .unwrap();

    let stored = pipeline.store().get("doc").await.unwrap().unwrap();
    let restored = DocumentIndex::from_blob(&stored.to_blob().unwrap()).unwrap();
    assert_eq!(*stored, restored);

    let retriever = Retriever::new(0.0, 1e-9);
    let before = retriever.search(&stored, "refunds processed", 3).unwrap();
    let after = retriever.search(&restored, "refunds processed", 3).unwrap();

    let scores = |r: &docqa_retrieval::Retrieval| {
        r.chunks().iter().map(|c| (c.chunk.position, c.score)).collect::<Vec<_>>()
    };
    assert_eq!(scores(&before), scores(&after));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reindexing_publishes_one_complete_index() {
    let pipeline = Arc::new(pipeline());

    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            let text = if i % 2 == 0 {
                "alpha beta gamma delta"
            } else {
                "epsilon zeta eta theta"
            };
            pipeline.index_text("doc", "doc.txt", text).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let index = pipeline.store().get("doc").await.unwrap().unwrap();
    let vocabulary: Vec<&str> = index.idf.keys().map(String::as_str).collect();
    assert!(
        vocabulary == ["alpha", "beta", "delta", "gamma"]
            || vocabulary == ["epsilon", "eta", "theta", "zeta"],
        "published vocabulary mixes rebuilds: {vocabulary:?}"
    );
    assert_eq!(pipeline.store().stats().await.unwrap().document_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_queries_share_the_published_snapshot() {
    let pipeline = Arc::new(pipeline());
    pipeline
        .index_text("doc", "doc.txt", "refund policy for returned goods")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move { pipeline.query("doc", "refund", None).await }));
    }
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(result.is_relevant());
        assert_eq!(result.chunks()[0].chunk.position, 0);
    }
}

/// Store that parks `put` calls until released, counting how many run at
/// once.
struct GatedStore {
    inner: InMemoryIndexStore,
    gate: Semaphore,
    entered: mpsc::UnboundedSender<()>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl GatedStore {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (entered, entries) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            inner: InMemoryIndexStore::new(),
            gate: Semaphore::new(0),
            entered,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        (store, entries)
    }
}

#[async_trait]
impl IndexStore for GatedStore {
    async fn get(&self, document_id: &str) -> Result<Option<Arc<DocumentIndex>>> {
        self.inner.get(document_id).await
    }

    async fn put(&self, index: Arc<DocumentIndex>) -> Result<()> {
        let live = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(live, Ordering::SeqCst);
        let _ = self.entered.send(());
        let _permit = self.gate.acquire().await.expect("gate semaphore closed");
        let result = self.inner.put(index).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn remove(&self, document_id: &str) -> Result<bool> {
        self.inner.remove(document_id).await
    }

    async fn document_ids(&self) -> Result<Vec<String>> {
        self.inner.document_ids().await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.inner.stats().await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn remove_during_a_build_keeps_builds_serialized() {
    let (store, mut entries) = GatedStore::new();
    let pipeline = Arc::new(
        RetrievalPipeline::builder()
            .config(RetrievalConfig::default())
            .store(store.clone())
            .build()
            .unwrap(),
    );

    let first = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.index_text("doc", "doc.txt", "alpha beta gamma").await }
    });
    entries.recv().await.expect("first build never reached the store");

    pipeline.remove_document("doc").await.unwrap();

    let second = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.index_text("doc", "doc.txt", "delta epsilon zeta").await }
    });

    // The second build must queue behind the first, which is still
    // publishing, even though the document was removed in between.
    let reached = tokio::time::timeout(Duration::from_millis(200), entries.recv()).await;
    assert!(reached.is_err(), "second build reached the store during the first");

    store.gate.add_permits(2);
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn removed_documents_stop_answering() {
    let pipeline = pipeline();
    pipeline.ingest("sales", "sales.csv", SALES_CSV, SourceFormat::Csv).await.unwrap();
    assert_eq!(pipeline.store().document_ids().await.unwrap(), vec!["sales"]);

    assert!(pipeline.remove_document("sales").await.unwrap());
    assert!(matches!(
        pipeline.query("sales", "refund", None).await,
        Err(RetrievalError::IndexNotBuilt { .. })
    ));
    assert!(pipeline.store().document_ids().await.unwrap().is_empty());
}
