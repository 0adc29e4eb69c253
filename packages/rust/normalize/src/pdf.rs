//! PDF page-text extraction.
//!
//! The normalizer only sees the [`PageExtractor`] trait. The `lopdf`-backed
//! implementation is compiled in with the `pdf` feature (on by default).

use std::sync::Arc;

/// Failure while pulling text out of a PDF.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ExtractError {
    message: String,
}

impl ExtractError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Extracts the text of every page of a PDF, in page order.
pub trait PageExtractor: Send + Sync {
    /// One entry per page; pages without text yield empty strings.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// The extractor this build ships with, if any.
pub fn default_extractor() -> Option<Arc<dyn PageExtractor>> {
    #[cfg(feature = "pdf")]
    {
        Some(Arc::new(LopdfExtractor))
    }
    #[cfg(not(feature = "pdf"))]
    {
        None
    }
}

/// Whether PDF support was compiled into this build.
pub fn pdf_support_compiled() -> bool {
    cfg!(feature = "pdf")
}

/// Join page texts with `--- PAGE <n> ---` markers. Blank pages are skipped
/// but keep their number.
pub(crate) fn render_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| format!("--- PAGE {} ---\n{}", i + 1, text.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// lopdf
// ---------------------------------------------------------------------------

/// [`PageExtractor`] backed by `lopdf`.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

#[cfg(feature = "pdf")]
impl PageExtractor for LopdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::new(e.to_string()))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        tracing::debug!(pages = page_numbers.len(), "loaded PDF");

        let pages = page_numbers
            .into_iter()
            .map(|page| {
                doc.extract_text(&[page]).unwrap_or_else(|e| {
                    tracing::debug!(page, error = %e, "no extractable text on page");
                    String::new()
                })
            })
            .collect();

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pages_numbers_from_one() {
        let pages = vec!["first".to_string(), "second\n".to_string()];
        assert_eq!(render_pages(&pages), "--- PAGE 1 ---\nfirst\n\n--- PAGE 2 ---\nsecond");
    }

    #[test]
    fn render_pages_empty_input() {
        assert_eq!(render_pages(&[]), "");
        assert_eq!(render_pages(&[" ".to_string()]), "");
    }

    #[test]
    fn default_extractor_matches_feature() {
        assert_eq!(default_extractor().is_some(), pdf_support_compiled());
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn lopdf_rejects_non_pdf_bytes() {
        let err = LopdfExtractor.extract_pages(b"this is not a pdf").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
