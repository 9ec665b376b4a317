//! Persistent chunk store with exact cosine-similarity search.
//!
//! One store instance owns one JSON index file (`{model, chunks}`) and the
//! in-memory chunk list loaded from it. Ingestion replaces every chunk that
//! shares the incoming document title before appending the new chunks, then
//! rewrites the whole file through a temp-file-and-rename.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use lectern_core::error::{LecternError, Result};
use lectern_core::traits::Embedder;

use crate::chunker::split_words;

/// One embedded slice of a document; the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique id, `"{document_id}:{index}"`.
    pub chunk_id: String,
    pub document_id: String,
    /// Human-readable label; dedup key and citation label.
    pub document_title: String,
    /// Zero-based position within the document (display only).
    pub index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Summary of one ingested document, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub document_id: String,
    pub title: String,
    pub source: Option<String>,
    pub chunk_count: usize,
}

/// A chunk with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f32,
    pub chunk: DocumentChunk,
}

/// Knobs for one ingestion call.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Explicit document title; falls back to the source file stem.
    pub title: Option<String>,
    /// Where the text came from (path or label), kept in the returned meta.
    pub source: Option<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { title: None, source: None, chunk_size: 600, chunk_overlap: 120 }
    }
}

/// Persistent store of embedded document chunks.
#[derive(Debug)]
pub struct DocumentStore {
    index_path: PathBuf,
    chunks: Vec<DocumentChunk>,
    model_name: Option<String>,
}

impl DocumentStore {
    /// Open a store backed by `index_path`, loading the index if it exists.
    ///
    /// A missing file is a fresh, empty store. A present-but-malformed file
    /// is a fatal [`LecternError::Index`] — it is never treated as empty.
    pub fn open(index_path: impl Into<PathBuf>) -> Result<Self> {
        let index_path = index_path.into();
        if let Some(parent) = index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut store = Self { index_path, chunks: Vec::new(), model_name: None };
        if store.index_path.is_file() {
            store.load_index()?;
            tracing::debug!(
                "Loaded document index: {} chunk(s) from {}",
                store.chunks.len(),
                store.index_path.display()
            );
        }
        Ok(store)
    }

    // ---- Persistence ----

    fn load_index(&mut self) -> Result<()> {
        let content = std::fs::read_to_string(&self.index_path)?;
        let payload: Value = serde_json::from_str(&content).map_err(|e| {
            LecternError::Index(format!(
                "Failed to parse document index at {}: {e}",
                self.index_path.display()
            ))
        })?;

        self.model_name = payload["model"].as_str().map(String::from);
        self.chunks = match payload.get("chunks") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(chunk_from_value).collect(),
            Some(_) => {
                return Err(LecternError::Index(
                    "Document index is corrupted: expected a list of chunks".into(),
                ));
            }
        };
        Ok(())
    }

    /// Rewrite the whole index file: temp file in the same directory, then
    /// atomic rename, so an interrupted write never corrupts the index.
    fn save_index(&self) -> Result<()> {
        let payload = json!({
            "model": self.model_name,
            "chunks": self.chunks,
        });
        let content = serde_json::to_string_pretty(&payload)
            .map_err(|e| LecternError::Index(format!("Failed to serialize index: {e}")))?;

        let file_name = self
            .index_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document_index.json".into());
        let tmp_path = self.index_path.with_file_name(format!("{file_name}.tmp"));
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.index_path)?;
        Ok(())
    }

    // ---- Ingestion ----

    /// Chunk, embed, and persist one document's text.
    ///
    /// Re-ingesting a title supersedes it: every prior chunk under the same
    /// title is removed before the new ones are appended. Nothing is written
    /// to disk unless embedding succeeded for every chunk.
    pub async fn ingest(
        &mut self,
        text: &str,
        embedder: &dyn Embedder,
        opts: &IngestOptions,
    ) -> Result<DocumentMeta> {
        if text.trim().is_empty() {
            return Err(LecternError::Content(
                "The supplied document does not contain any text".into(),
            ));
        }

        let chunk_texts = split_words(text, opts.chunk_size, opts.chunk_overlap);
        if chunk_texts.is_empty() {
            return Err(LecternError::Content(
                "Could not split the document into meaningful text chunks".into(),
            ));
        }

        let embeddings = embedder.embed(&chunk_texts).await?;
        if embeddings.len() != chunk_texts.len() {
            return Err(LecternError::Index(format!(
                "Embedding API returned {} vector(s) for {} chunk(s)",
                embeddings.len(),
                chunk_texts.len()
            )));
        }

        let document_id = Uuid::new_v4().to_string();
        let document_title = opts
            .title
            .clone()
            .or_else(|| title_from_source(opts.source.as_deref()))
            .unwrap_or_else(|| "Untitled document".into());

        // Dedup-replace: a title is superseded wholesale, never appended to.
        self.chunks.retain(|chunk| chunk.document_title != document_title);

        let chunk_count = chunk_texts.len();
        for (index, (chunk_text, embedding)) in
            chunk_texts.into_iter().zip(embeddings).enumerate()
        {
            self.chunks.push(DocumentChunk {
                chunk_id: format!("{document_id}:{index}"),
                document_id: document_id.clone(),
                document_title: document_title.clone(),
                index,
                text: chunk_text,
                embedding,
            });
        }

        self.model_name = Some(embedder.model_name().to_string());
        self.save_index()?;

        tracing::info!(
            "Ingested '{}': {} chunk(s), index now holds {}",
            document_title,
            chunk_count,
            self.chunks.len()
        );

        Ok(DocumentMeta {
            document_id,
            title: document_title,
            source: opts.source.clone(),
            chunk_count,
        })
    }

    // ---- Retrieval ----

    /// Return the `top_k` most relevant chunks for `query`, best first.
    ///
    /// An empty store returns an empty vec without calling the embedder.
    /// Only strictly positive scores are returned; ties keep insertion order.
    pub async fn search(
        &self,
        query: &str,
        embedder: &dyn Embedder,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_batch = [query.to_string()];
        let mut vectors = embedder.embed(&query_batch).await?;
        if vectors.is_empty() {
            return Err(LecternError::Provider(
                "Embedding API returned no vector for the query".into(),
            ));
        }
        let query_embedding = vectors.remove(0);

        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let score = cosine_similarity(&query_embedding, &chunk.embedding);
                (score > 0.0).then(|| ScoredChunk { score, chunk: chunk.clone() })
            })
            .collect();

        // Stable sort: equal scores keep store (insertion) order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    // ---- Introspection ----

    /// Whether at least one chunk is available for retrieval.
    pub fn has_content(&self) -> bool {
        !self.chunks.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Embedding model that produced the stored vectors, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Document summaries derived from the chunk list, in insertion order.
    pub fn documents(&self) -> Vec<DocumentMeta> {
        let mut docs: Vec<DocumentMeta> = Vec::new();
        for chunk in &self.chunks {
            match docs.iter_mut().find(|d| d.document_id == chunk.document_id) {
                Some(doc) => doc.chunk_count += 1,
                None => docs.push(DocumentMeta {
                    document_id: chunk.document_id.clone(),
                    title: chunk.document_title.clone(),
                    source: None,
                    chunk_count: 1,
                }),
            }
        }
        docs
    }
}

fn title_from_source(source: Option<&str>) -> Option<String> {
    let source = source?;
    Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
}

/// Coerce one persisted chunk record, defaulting malformed fields instead of
/// rejecting the record: one bad field never sinks the whole store.
fn chunk_from_value(value: &Value) -> DocumentChunk {
    DocumentChunk {
        chunk_id: value["chunk_id"].as_str().unwrap_or_default().to_string(),
        document_id: value["document_id"].as_str().unwrap_or_default().to_string(),
        document_title: value["document_title"].as_str().unwrap_or_default().to_string(),
        index: value["index"].as_u64().unwrap_or(0) as usize,
        text: value["text"].as_str().unwrap_or_default().to_string(),
        embedding: value["embedding"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_f64())
                    .map(|v| v as f32)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Cosine similarity between two vectors.
///
/// Degenerate inputs (empty vector, length mismatch, zero norm) score
/// exactly 0.0 — never an error, never NaN. Mixing vectors from different
/// embedding models therefore degrades to zero relevance instead of failing.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    if left.is_empty() || right.is_empty() || left.len() != right.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_left = 0.0f64;
    let mut norm_right = 0.0f64;
    for (a, b) in left.iter().zip(right) {
        dot += f64::from(*a) * f64::from(*b);
        norm_left += f64::from(*a) * f64::from(*a);
        norm_right += f64::from(*b) * f64::from(*b);
    }
    if norm_left == 0.0 || norm_right == 0.0 {
        return 0.0;
    }
    (dot / (norm_left.sqrt() * norm_right.sqrt())) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Maps every text to a fixed vector chosen up front.
    struct StubEmbedder {
        vectors: Vec<Vec<f32>>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn model_name(&self) -> &str {
            "stub-embed-001"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, _)| self.vectors[i % self.vectors.len()].clone())
                .collect())
        }
    }

    /// Fails every call — proves a path never reaches the embedder.
    struct ExplodingEmbedder;

    #[async_trait]
    impl Embedder for ExplodingEmbedder {
        fn model_name(&self) -> &str {
            "exploding"
        }

        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(LecternError::Provider("embedder must not be called".into()))
        }
    }

    /// Returns one vector fewer than requested.
    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        fn model_name(&self) -> &str {
            "short"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn temp_store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("document_index.json")).unwrap();
        (dir, store)
    }

    fn chunk(id: &str, title: &str, index: usize, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk {
            chunk_id: format!("{id}:{index}"),
            document_id: id.to_string(),
            document_title: title.to_string(),
            index,
            text: format!("chunk {index} of {title}"),
            embedding,
        }
    }

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    // ---- Cosine similarity ----

    #[test]
    fn test_cosine_self_similarity_is_one() {
        let v = vec![0.3, -1.2, 4.5, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_cases_are_zero() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    // ---- Persistence ----

    #[test]
    fn test_missing_index_file_is_empty_store() {
        let (_dir, store) = temp_store();
        assert!(!store.has_content());
        assert_eq!(store.chunk_count(), 0);
        assert!(store.model_name().is_none());
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_index.json");

        let mut store = DocumentStore::open(&path).unwrap();
        store.chunks.push(chunk("doc-a", "Lecture 1 — Ωmega", 0, vec![0.5, -0.25, 1.0]));
        store.chunks.push(chunk("doc-a", "Lecture 1 — Ωmega", 1, vec![0.1, 0.2, 0.3]));
        store.model_name = Some("text-embedding-3-small".into());
        store.save_index().unwrap();

        let reloaded = DocumentStore::open(&path).unwrap();
        assert_eq!(reloaded.chunks, store.chunks);
        assert_eq!(reloaded.model_name(), Some("text-embedding-3-small"));
    }

    #[test]
    fn test_malformed_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_index.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DocumentStore::open(&path).unwrap_err();
        assert!(matches!(err, LecternError::Index(_)), "got {err:?}");
    }

    #[test]
    fn test_non_list_chunks_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_index.json");
        std::fs::write(&path, r#"{"model": "m", "chunks": {"0": {}}}"#).unwrap();

        let err = DocumentStore::open(&path).unwrap_err();
        assert!(matches!(err, LecternError::Index(_)));
    }

    #[test]
    fn test_partial_chunk_records_are_coerced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_index.json");
        std::fs::write(
            &path,
            r#"{"model": "m", "chunks": [
                {"chunk_id": "a:0", "text": "kept"},
                {"document_title": "Lecture", "index": 7, "embedding": [1.0, "oops", 2.0]}
            ]}"#,
        )
        .unwrap();

        let store = DocumentStore::open(&path).unwrap();
        assert_eq!(store.chunk_count(), 2);
        assert_eq!(store.chunks[0].chunk_id, "a:0");
        assert_eq!(store.chunks[0].text, "kept");
        assert_eq!(store.chunks[0].index, 0);
        assert!(store.chunks[0].embedding.is_empty());
        assert_eq!(store.chunks[1].document_title, "Lecture");
        assert_eq!(store.chunks[1].index, 7);
        // Non-numeric embedding entries are dropped, not fatal.
        assert_eq!(store.chunks[1].embedding, vec![1.0, 2.0]);
    }

    #[test]
    fn test_save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_index.json");
        let mut store = DocumentStore::open(&path).unwrap();
        store.chunks.push(chunk("d", "T", 0, vec![1.0]));
        store.save_index().unwrap();

        assert!(path.is_file());
        assert!(!dir.path().join("document_index.json.tmp").exists());
    }

    // ---- Ingestion ----

    #[tokio::test]
    async fn test_ingest_builds_expected_chunks() {
        let (_dir, mut store) = temp_store();
        let embedder = StubEmbedder { vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]] };
        let opts = IngestOptions {
            title: None,
            source: Some("notes/Lecture1.md".into()),
            chunk_size: 600,
            chunk_overlap: 120,
        };

        let meta = store.ingest(&numbered_words(1200), &embedder, &opts).await.unwrap();
        assert_eq!(meta.chunk_count, 3);
        assert_eq!(meta.title, "Lecture1");
        assert_eq!(store.chunk_count(), 3);
        assert_eq!(store.model_name(), Some("stub-embed-001"));
        for (i, c) in store.chunks.iter().enumerate() {
            assert_eq!(c.chunk_id, format!("{}:{}", meta.document_id, i));
            assert_eq!(c.index, i);
            assert_eq!(c.document_title, "Lecture1");
        }
    }

    #[tokio::test]
    async fn test_ingest_empty_text_is_content_error() {
        let (_dir, mut store) = temp_store();
        let err = store
            .ingest("   \n ", &ExplodingEmbedder, &IngestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::Content(_)));
        assert_eq!(store.chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_ingest_count_mismatch_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_index.json");
        let mut store = DocumentStore::open(&path).unwrap();

        let embedder = StubEmbedder { vectors: vec![vec![1.0, 0.0]] };
        let opts = IngestOptions { title: Some("Keep".into()), ..IngestOptions::default() };
        store.ingest("existing content words", &embedder, &opts).await.unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();

        let opts = IngestOptions { title: Some("New".into()), ..IngestOptions::default() };
        let err = store
            .ingest(&numbered_words(1200), &ShortEmbedder, &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::Index(_)));

        // In-memory and on-disk state both still reflect the first ingestion.
        assert_eq!(store.chunk_count(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), saved);
    }

    #[tokio::test]
    async fn test_reingesting_title_supersedes_prior_chunks() {
        let (_dir, mut store) = temp_store();
        let embedder = StubEmbedder { vectors: vec![vec![1.0, 0.5]] };

        let opts = |title: &str| IngestOptions {
            title: Some(title.into()),
            source: None,
            chunk_size: 10,
            chunk_overlap: 2,
        };

        store.ingest(&numbered_words(25), &embedder, &opts("Lecture1")).await.unwrap();
        store.ingest(&numbered_words(40), &embedder, &opts("Lecture2")).await.unwrap();
        let before = store.chunk_count();
        let lecture1_before =
            store.chunks.iter().filter(|c| c.document_title == "Lecture1").count();

        let meta = store
            .ingest(&numbered_words(55), &embedder, &opts("Lecture1"))
            .await
            .unwrap();

        let lecture1_after: Vec<_> =
            store.chunks.iter().filter(|c| c.document_title == "Lecture1").collect();
        assert_eq!(lecture1_after.len(), meta.chunk_count);
        // Every surviving Lecture1 chunk belongs to the new ingestion.
        assert!(lecture1_after.iter().all(|c| c.document_id == meta.document_id));
        assert_eq!(
            store.chunk_count(),
            before - lecture1_before + meta.chunk_count
        );
        // Lecture2 untouched.
        assert!(store.chunks.iter().any(|c| c.document_title == "Lecture2"));
    }

    // ---- Search ----

    #[tokio::test]
    async fn test_search_empty_store_skips_embedder() {
        let (_dir, store) = temp_store();
        let results = store.search("anything", &ExplodingEmbedder, 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity_and_truncates() {
        let (_dir, mut store) = temp_store();
        store.chunks.push(chunk("d", "T", 0, vec![1.0, 0.0]));
        store.chunks.push(chunk("d", "T", 1, vec![0.9, 0.1]));
        store.chunks.push(chunk("d", "T", 2, vec![0.0, 1.0])); // orthogonal → dropped
        store.chunks.push(chunk("d", "T", 3, vec![-1.0, 0.0])); // negative → dropped
        store.chunks.push(chunk("d", "T", 4, vec![0.5, 0.5]));

        let embedder = StubEmbedder { vectors: vec![vec![1.0, 0.0]] };
        let results = store.search("q", &embedder, 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.index, 0);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert_eq!(results[1].chunk.index, 1);
        assert!(results.iter().all(|r| r.score > 0.0));
    }

    #[tokio::test]
    async fn test_search_ties_keep_insertion_order() {
        let (_dir, mut store) = temp_store();
        store.chunks.push(chunk("d", "T", 0, vec![2.0, 0.0]));
        store.chunks.push(chunk("d", "T", 1, vec![4.0, 0.0])); // same direction, same score
        store.chunks.push(chunk("d", "T", 2, vec![1.0, 1.0]));

        let embedder = StubEmbedder { vectors: vec![vec![1.0, 0.0]] };
        let results = store.search("q", &embedder, 10).await.unwrap();

        assert_eq!(results[0].chunk.index, 0);
        assert_eq!(results[1].chunk.index, 1);
        assert_eq!(results[2].chunk.index, 2);
    }

    #[tokio::test]
    async fn test_search_mismatched_dimensions_scores_zero() {
        // Chunks embedded under a 3-dimensional model, query under 2.
        let (_dir, mut store) = temp_store();
        store.chunks.push(chunk("d", "T", 0, vec![1.0, 0.0, 0.0]));

        let embedder = StubEmbedder { vectors: vec![vec![1.0, 0.0]] };
        let results = store.search("q", &embedder, 3).await.unwrap();
        assert!(results.is_empty());
    }

    // ---- Documents ----

    #[tokio::test]
    async fn test_documents_summarizes_in_insertion_order() {
        let (_dir, mut store) = temp_store();
        let embedder = StubEmbedder { vectors: vec![vec![1.0]] };
        let opts = |title: &str| IngestOptions {
            title: Some(title.into()),
            source: None,
            chunk_size: 10,
            chunk_overlap: 0,
        };
        store.ingest(&numbered_words(25), &embedder, &opts("A")).await.unwrap();
        store.ingest(&numbered_words(5), &embedder, &opts("B")).await.unwrap();

        let docs = store.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "A");
        assert_eq!(docs[0].chunk_count, 3);
        assert_eq!(docs[1].title, "B");
        assert_eq!(docs[1].chunk_count, 1);
    }
}
