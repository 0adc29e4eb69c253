//! Reference context assembler.
//!
//! Normalizes every uploaded reference document, chunks it, scores each chunk
//! against the SOAP query, and keeps the top-K chunks as a source-labeled
//! "context pack" for the design and code prompts.

use tracing::{debug, info, instrument};

use soapbridge_normalize::Normalizer;
use soapbridge_shared::{Chunk, ReferenceDocument, RetrievalConfig, ScoredChunk};

use crate::chunker;
use crate::scorer::QueryScorer;

/// Separator placed between rendered context entries.
pub const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

// ---------------------------------------------------------------------------
// ContextPack
// ---------------------------------------------------------------------------

/// The selected chunks, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPack {
    entries: Vec<ScoredChunk>,
}

impl ContextPack {
    pub fn entries(&self) -> &[ScoredChunk] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `[SOURCE FILE: <name>]\n<text>` entries joined by
    /// [`ENTRY_SEPARATOR`]. Empty pack renders as an empty string.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "[SOURCE FILE: {}]\n{}",
                    entry.chunk.source_name, entry.chunk.text
                )
            })
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }
}

// ---------------------------------------------------------------------------
// ContextAssembler
// ---------------------------------------------------------------------------

/// Builds context packs from reference documents.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    normalizer: Normalizer,
    config: RetrievalConfig,
}

impl ContextAssembler {
    pub fn new(normalizer: Normalizer, config: RetrievalConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Select the top-K chunks across all documents.
    ///
    /// Ties keep document order, then chunk order: the candidate list is
    /// built in that order and sorted with a stable sort.
    #[instrument(skip_all, fields(documents = documents.len(), top_k = self.config.top_k))]
    pub fn select(&self, documents: &[ReferenceDocument], query: &str) -> ContextPack {
        if documents.is_empty() {
            return ContextPack::default();
        }

        let candidates = self.collect_chunks(documents);
        let scorer = QueryScorer::new(query);

        let mut scored: Vec<ScoredChunk> = candidates
            .into_iter()
            .map(|chunk| {
                let score = scorer.score(&chunk.text);
                ScoredChunk { chunk, score }
            })
            .collect();

        let candidate_count = scored.len();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.config.top_k);

        info!(
            candidates = candidate_count,
            selected = scored.len(),
            best_score = scored.first().map(|s| s.score).unwrap_or(0.0),
            "context pack selected"
        );

        ContextPack { entries: scored }
    }

    /// Select and render in one step. Returns `""` when there is nothing
    /// to ground on.
    pub fn assemble(&self, documents: &[ReferenceDocument], query: &str) -> String {
        self.select(documents, query).render()
    }

    /// Normalize and chunk every document, in input order. Documents whose
    /// text is blank contribute nothing.
    fn collect_chunks(&self, documents: &[ReferenceDocument]) -> Vec<Chunk> {
        let mut all = Vec::new();

        for document in documents {
            let normalized = self.normalizer.normalize(document);
            if normalized.is_blank() {
                debug!(name = %document.name, "document has no text, skipping");
                continue;
            }

            let chunks =
                chunker::chunk_source(&normalized, self.config.chunk_size, self.config.overlap);
            debug!(name = %document.name, chunks = chunks.len(), "chunked document");
            all.extend(chunks);
        }

        all
    }
}

/// Assemble a context pack with default chunking and the given `top_k`,
/// using the build's default PDF extractor.
pub fn assemble_context(documents: &[ReferenceDocument], query: &str, top_k: usize) -> String {
    let config = RetrievalConfig {
        top_k,
        ..RetrievalConfig::default()
    };
    ContextAssembler::new(Normalizer::with_default_extractor(), config).assemble(documents, query)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
