//! # Lectern Core
//!
//! Shared foundation for every Lectern crate: the configuration system,
//! the `LecternError` type, chat message types, and the trait seams
//! (`Provider`, `Embedder`) that the agent and the document index are
//! written against.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::LecternConfig;
pub use error::{LecternError, Result};
