//! JSON API handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use lectern_core::types::Message;
use lectern_index::IngestOptions;

use super::server::AppState;

/// Liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

/// Handle one chat turn from the web UI.
///
/// Body: `{"message": str, "history": [{"role", "content"}, ...]}`.
/// Replies with the assistant text and the updated history, mirroring what
/// the console loop keeps in memory.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let message = body["message"].as_str().unwrap_or("").trim().to_string();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Please provide a prompt for Lectern."})),
        );
    }

    let mut conversation = sanitize_history(&body["history"]);
    conversation.push(Message::user(&message));

    let agent = state.agent.lock().await;
    let Some(agent) = agent.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Chat engine not available"})),
        );
    };

    match agent.generate_response(&conversation).await {
        Ok(response) => {
            conversation.push(Message::assistant(&response));
            (
                StatusCode::OK,
                Json(json!({"response": response, "history": conversation})),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        ),
    }
}

/// List ingested documents with their chunk counts.
pub async fn list_documents(State(state): State<Arc<AppState>>) -> Json<Value> {
    let Some(store) = &state.store else {
        return Json(json!({"ok": false, "error": "Document index not available"}));
    };
    let store = store.lock().await;
    let documents = store.documents();
    Json(json!({
        "ok": true,
        "documents": documents,
        "total_docs": documents.len(),
        "total_chunks": store.chunk_count(),
        "model": store.model_name(),
    }))
}

/// Ingest one document's plain text into the index.
///
/// Body: `{"content": str, "name": str?, "title": str?}`. Extraction from
/// PDFs or other binary formats happens before this endpoint.
pub async fn ingest_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let content = body["content"].as_str().unwrap_or("");
    if content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Document content is empty"})),
        );
    }

    let Some(store) = &state.store else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Document index not available"})),
        );
    };

    let opts = IngestOptions {
        title: body["title"].as_str().map(String::from),
        source: body["name"].as_str().map(String::from),
        chunk_size: state.config.retrieval.chunk_size,
        chunk_overlap: state.config.retrieval.chunk_overlap,
    };

    let mut store = store.lock().await;
    match store.ingest(content, state.embedder.as_ref(), &opts).await {
        Ok(meta) => (
            StatusCode::OK,
            Json(json!({"ok": true, "document": meta})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": e.to_string()})),
        ),
    }
}

/// Search the index directly (debugging / inspection endpoint).
///
/// Body: `{"query": str, "top_k": int?}`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let query = body["query"].as_str().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Please provide a search query"})),
        );
    }
    let top_k = body["top_k"].as_u64().unwrap_or(state.config.retrieval.top_k as u64) as usize;

    let Some(store) = &state.store else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Document index not available"})),
        );
    };

    let store = store.lock().await;
    match store.search(&query, state.embedder.as_ref(), top_k).await {
        Ok(results) => {
            let items: Vec<Value> = results
                .iter()
                .map(|r| {
                    json!({
                        "score": r.score,
                        "chunk_id": r.chunk.chunk_id,
                        "document_title": r.chunk.document_title,
                        "section": r.chunk.index + 1,
                        "text": r.chunk.text,
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({"ok": true, "results": items, "count": items.len()})),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": e.to_string()})),
        ),
    }
}

/// Keep only well-formed user/assistant turns from client-supplied history.
fn sanitize_history(history: &Value) -> Vec<Message> {
    let Some(items) = history.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let role = item["role"].as_str()?;
            let content = item["content"].as_str()?;
            match role {
                "user" => Some(Message::user(content)),
                "assistant" => Some(Message::assistant(content)),
                _ => None,
            }
        })
        .collect()
}
