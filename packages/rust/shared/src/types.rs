//! Core domain types for the reference-context pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoapBridgeError};

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// Normalization strategy for a reference document, resolved once from its
/// file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Machine-readable JSON (OpenAPI specs, sample payloads).
    Json,
    /// YAML documents, kept as plain text.
    Yaml,
    /// `.txt` / `.md` notes.
    PlainText,
    /// PDF documents, text extracted page by page.
    Pdf,
}

/// Extensions accepted for reference uploads.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "txt", "md", "pdf"];

impl DocumentKind {
    /// Resolve the kind from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "txt" | "md" => Ok(Self::PlainText),
            "pdf" => Ok(Self::Pdf),
            _ => Err(SoapBridgeError::validation(format!(
                "unsupported reference file: {name} (expected one of: {})",
                SUPPORTED_EXTENSIONS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::PlainText => "plain-text",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReferenceDocument
// ---------------------------------------------------------------------------

/// An uploaded reference document. Immutable once created.
#[derive(Debug, Clone)]
pub struct ReferenceDocument {
    /// Original file name; also the provenance label in the context pack.
    pub name: String,
    /// Normalization strategy.
    pub kind: DocumentKind,
    /// Raw file contents.
    pub raw_bytes: Vec<u8>,
}

impl ReferenceDocument {
    /// Build a document, resolving its kind from the name's extension.
    pub fn new(name: impl Into<String>, raw_bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let name = name.into();
        let kind = DocumentKind::from_file_name(&name)?;
        Ok(Self {
            name,
            kind,
            raw_bytes: raw_bytes.into(),
        })
    }

    /// Read a document from disk. The file name (not the full path) becomes
    /// the document name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                SoapBridgeError::validation(format!("not a file path: {}", path.display()))
            })?;
        let kind = DocumentKind::from_file_name(&name)?;
        let raw_bytes = std::fs::read(path).map_err(|e| SoapBridgeError::io(path, e))?;
        Ok(Self {
            name,
            kind,
            raw_bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// NormalizedText / Chunk / ScoredChunk
// ---------------------------------------------------------------------------

/// Plain text derived from a [`ReferenceDocument`]. Empty text means the
/// document had nothing readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub source_name: String,
    pub text: String,
}

impl NormalizedText {
    /// True when the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A contiguous word window of one source's normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub source_name: String,
    pub text: String,
    /// Position of this chunk within its source.
    pub ordinal: usize,
}

/// A chunk with its relevance score against the current query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// TargetStack
// ---------------------------------------------------------------------------

/// Client stack the generated code targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetStack {
    #[default]
    PythonRequests,
    NodeAxios,
    JavaHttp,
    DotnetHttpClient,
}

impl TargetStack {
    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PythonRequests => "Python requests client",
            Self::NodeAxios => "Node.js Axios client",
            Self::JavaHttp => "Java HTTP client",
            Self::DotnetHttpClient => ".NET C# HttpClient",
        }
    }
}

impl std::fmt::Display for TargetStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
