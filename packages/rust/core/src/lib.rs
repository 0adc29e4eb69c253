//! Retrieval, prompting, and conversion pipeline for SoapBridge.
//!
//! This crate ties together reference normalization, chunking, query scoring,
//! and the two model stages into the end-to-end `convert` workflow.

pub mod assembler;
pub mod chunker;
pub mod hints;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod scorer;
