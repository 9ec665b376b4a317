//! # Lectern Index
//!
//! The document retrieval index: turns raw lecture text into overlapping
//! word-bounded chunks, embeds them through an [`Embedder`], persists the
//! result in a single JSON file, and answers queries by exact cosine
//! similarity search.
//!
//! ## How it works
//! ```text
//! lecture text
//!   ↓ chunker::split_words (sliding window, word-bounded)
//! chunk texts
//!   ↓ Embedder::embed (one batch call)
//! vectors
//!   ↓ DocumentStore (dedup-replace by title, full rewrite to disk)
//! query → Embedder → cosine scan → top-k chunks
//!   ↓ prompt::build_system_prompt
//! context injected into the chat conversation
//! ```
//!
//! Single-process, single-writer, exact search. One `DocumentStore` instance
//! owns the in-memory chunk list and the index file exclusively.
//!
//! [`Embedder`]: lectern_core::traits::Embedder

pub mod chunker;
pub mod prompt;
pub mod store;

pub use store::{DocumentChunk, DocumentMeta, DocumentStore, IngestOptions, ScoredChunk};
