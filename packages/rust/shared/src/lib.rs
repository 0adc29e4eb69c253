//! Shared types, error model, and configuration for SoapBridge.
//!
//! This crate is the foundation depended on by all other SoapBridge crates.
//! It provides:
//! - [`SoapBridgeError`]: the unified error type
//! - Domain types ([`ReferenceDocument`], [`DocumentKind`], [`Chunk`], [`ScoredChunk`])
//! - Configuration ([`AppConfig`], [`RetrievalConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GeminiConfig, RetrievalConfig, RetrievalSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, SoapBridgeError};
pub use types::{
    Chunk, DocumentKind, NormalizedText, ReferenceDocument, SUPPORTED_EXTENSIONS, ScoredChunk,
    TargetStack,
};
