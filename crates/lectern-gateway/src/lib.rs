//! # Lectern Gateway
//!
//! Axum HTTP surface for Lectern: an embedded single-page chat UI and a
//! small JSON API over the chat engine and the document index.

pub mod page;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
