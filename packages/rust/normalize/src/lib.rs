//! Reference document normalization.
//!
//! Converts an uploaded document's raw bytes into plain text, dispatching on
//! its [`DocumentKind`]:
//! - JSON is decoded and pretty-printed (2-space indent, key order kept)
//! - YAML and plain text are decoded as-is
//! - PDF text is pulled page by page through an injected [`PageExtractor`]
//!
//! Normalization never fails. Unreadable input turns into a bracketed
//! placeholder that flows on into the context pack, so the model sees why a
//! reference is missing.

mod decode;
mod pdf;

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use soapbridge_shared::{DocumentKind, NormalizedText, ReferenceDocument};

pub use pdf::{ExtractError, PageExtractor, default_extractor, pdf_support_compiled};

#[cfg(feature = "pdf")]
pub use pdf::LopdfExtractor;

/// Placeholder used when a PDF arrives but no extractor is configured.
pub const PDF_UNAVAILABLE_PLACEHOLDER: &str = "[PDF upload received, but PDF text extraction is not available. \
     Rebuild soapbridge with the `pdf` feature to parse PDFs.]";

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Turns [`ReferenceDocument`]s into [`NormalizedText`].
///
/// The PDF capability is decided once, when the normalizer is built.
#[derive(Clone, Default)]
pub struct Normalizer {
    extractor: Option<Arc<dyn PageExtractor>>,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("pdf", &self.supports_pdf())
            .finish()
    }
}

impl Normalizer {
    /// Build a normalizer with an explicit (possibly absent) PDF extractor.
    pub fn new(extractor: Option<Arc<dyn PageExtractor>>) -> Self {
        Self { extractor }
    }

    /// Build a normalizer using whatever extractor this build ships with.
    pub fn with_default_extractor() -> Self {
        Self::new(default_extractor())
    }

    /// Whether PDF documents will be extracted rather than replaced by a
    /// placeholder.
    pub fn supports_pdf(&self) -> bool {
        self.extractor.is_some()
    }

    /// Normalize one document into plain text.
    #[instrument(skip_all, fields(name = %document.name, kind = %document.kind))]
    pub fn normalize(&self, document: &ReferenceDocument) -> NormalizedText {
        let text = match document.kind {
            DocumentKind::Pdf => self.normalize_pdf(&document.raw_bytes),
            DocumentKind::Json => match decode::decode_text(&document.raw_bytes) {
                Some(text) => pretty_json(&text).unwrap_or(text),
                None => unreadable_placeholder(&document.name),
            },
            DocumentKind::Yaml | DocumentKind::PlainText => {
                decode::decode_text(&document.raw_bytes)
                    .unwrap_or_else(|| unreadable_placeholder(&document.name))
            }
        };

        debug!(bytes = document.raw_bytes.len(), chars = text.len(), "normalized document");

        NormalizedText {
            source_name: document.name.clone(),
            text,
        }
    }

    fn normalize_pdf(&self, bytes: &[u8]) -> String {
        let Some(extractor) = &self.extractor else {
            debug!("no PDF extractor configured");
            return PDF_UNAVAILABLE_PLACEHOLDER.to_string();
        };

        match extractor.extract_pages(bytes) {
            Ok(pages) => pdf::render_pages(&pages),
            Err(e) => {
                warn!(error = %e, "PDF extraction failed");
                format!("[Failed to parse PDF: {e}]")
            }
        }
    }
}

/// Convenience wrapper: normalize with the build's default extractor.
pub fn normalize(document: &ReferenceDocument) -> NormalizedText {
    Normalizer::with_default_extractor().normalize(document)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse and re-serialize JSON with 2-space indentation. `None` when the
/// text is not valid JSON.
fn pretty_json(text: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "JSON parse failed, keeping raw text");
            return None;
        }
    };
    serde_json::to_string_pretty(&value).ok()
}

fn unreadable_placeholder(name: &str) -> String {
    format!("[Could not decode {name} as text.]")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
