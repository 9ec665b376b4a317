//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use lectern_agent::{Agent, SharedStore};
use lectern_core::config::LecternConfig;
use lectern_core::traits::Embedder;
use lectern_index::DocumentStore;
use lectern_providers::EmbeddingClient;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: LecternConfig,
    /// The chat engine; `None` when provider construction failed at startup.
    pub agent: Arc<tokio::sync::Mutex<Option<Agent>>>,
    /// The process's single document store; `None` when its index file was
    /// unreadable at startup (retrieval endpoints then report the failure).
    pub store: Option<SharedStore>,
    /// Embedding collaborator used by the ingestion/search endpoints.
    pub embedder: Arc<dyn Embedder>,
}

/// Serve the embedded chat page.
async fn chat_page() -> Html<&'static str> {
    Html(super::page::chat_html())
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route("/health", get(super::routes::health_check))
        .route("/api/chat", post(super::routes::chat))
        .route("/api/documents", get(super::routes::list_documents))
        .route("/api/documents", post(super::routes::ingest_document))
        .route("/api/search", post(super::routes::search))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server.
pub async fn start(config: LecternConfig) -> anyhow::Result<()> {
    let index_path = config.index_path();
    let store = match DocumentStore::open(&index_path) {
        Ok(store) => {
            if store.has_content() {
                tracing::info!(
                    "Document index: {} chunk(s) from {}",
                    store.chunk_count(),
                    index_path.display()
                );
            }
            Some(Arc::new(tokio::sync::Mutex::new(store)))
        }
        Err(e) => {
            tracing::warn!("Document index not available: {e}");
            None
        }
    };

    let agent = match Agent::new(config.clone()) {
        Ok(mut agent) => {
            if let Some(store) = &store {
                agent.set_store(store.clone());
            }
            tracing::info!(
                "Chat engine initialized (provider={}, model={})",
                agent.provider_name(),
                agent.model_name()
            );
            Some(agent)
        }
        Err(e) => {
            tracing::warn!("Chat engine not available: {e}");
            None
        }
    };

    let embedder: Arc<dyn Embedder> =
        Arc::new(EmbeddingClient::new(&config.embedding, &config.api_key)?);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = AppState {
        config,
        agent: Arc::new(tokio::sync::Mutex::new(agent)),
        store,
        embedder,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
