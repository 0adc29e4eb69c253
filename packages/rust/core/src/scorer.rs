//! Lexical relevance scoring of chunks against the SOAP query.
//!
//! Keyword overlap plus a fixed boost vocabulary of authentication and
//! shipping-protocol terms. No length normalization: longer chunks are not
//! penalized.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Weight of each distinct query token found in the chunk.
const TOKEN_HIT: f64 = 1.0;

/// Weight of a boost term present in both chunk and query.
const SHARED_BOOST: f64 = 3.0;

/// Weight of a boost term present in the chunk only.
const CHUNK_ONLY_BOOST: f64 = 0.5;

/// Domain boost vocabulary, lower-case.
pub const BOOST_TERMS: &[&str] = &[
    "oauth",
    "client_credentials",
    "bearer",
    "token",
    "authorization",
    "ship",
    "shipment",
    "label",
    "tracking",
    "accountnumber",
    "meter",
    "servicetype",
    "packagingtype",
    "requestedshipment",
    "/ship/v1",
    "/shipments",
    "rate limit",
    "429",
];

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9_/-]{3,}").expect("valid regex"));

/// Scores chunks against one query. Tokenizes the query once.
#[derive(Debug, Clone)]
pub struct QueryScorer {
    query: String,
    tokens: BTreeSet<String>,
}

impl QueryScorer {
    pub fn new(query: &str) -> Self {
        let query = query.to_lowercase();
        let tokens = query_tokens(&query);
        Self { query, tokens }
    }

    /// Distinct query tokens (length ≥ 3) used for overlap scoring.
    pub fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }

    /// Relevance of `chunk_text` to the query. Always ≥ 0.
    pub fn score(&self, chunk_text: &str) -> f64 {
        let chunk = chunk_text.to_lowercase();

        let overlap = self
            .tokens
            .iter()
            .filter(|token| chunk.contains(token.as_str()))
            .count() as f64
            * TOKEN_HIT;

        let boost: f64 = BOOST_TERMS
            .iter()
            .filter(|term| chunk.contains(*term))
            .map(|term| {
                if self.query.contains(term) {
                    SHARED_BOOST
                } else {
                    CHUNK_ONLY_BOOST
                }
            })
            .sum();

        overlap + boost
    }
}

/// Score one chunk against a query.
pub fn score(chunk_text: &str, query: &str) -> f64 {
    QueryScorer::new(query).score(chunk_text)
}

fn query_tokens(lowered: &str) -> BTreeSet<String> {
    TOKEN_RE
        .find_iter(lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipment_scenario_scores_overlap_and_boosts() {
        let chunk = "Use POST /ship/v1 to create a shipment. Track via GET /shipments/{id}.";
        let query = "shipment tracking /ship/v1";

        // tokens: shipment (+1), /ship/v1 (+1); "tracking" absent
        // boosts: ship, shipment, /ship/v1 shared (+9); /shipments chunk-only (+0.5)
        assert_eq!(score(chunk, query), 11.5);
    }

    #[test]
    fn empty_query_scores_zero_without_boost_terms() {
        assert_eq!(score("Create a pickup request for a parcel.", ""), 0.0);
    }

    #[test]
    fn empty_query_still_counts_chunk_only_boosts() {
        // oauth + token
        assert_eq!(score("Obtain an OAuth token first.", ""), 1.0);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        let lower = score("bearer token required", "Bearer");
        let upper = score("BEARER TOKEN REQUIRED", "bearer");
        assert_eq!(lower, upper);
        // "bearer" token (+1), bearer shared (+3), token chunk-only (+0.5)
        assert_eq!(lower, 4.5);
    }

    #[test]
    fn camel_case_boost_terms_match_after_lowercasing() {
        let s = score("requestedShipment.serviceType = FEDEX_GROUND", "");
        // requestedshipment, servicetype, ship, shipment: all chunk-only
        assert_eq!(s, 2.0);
    }

    #[test]
    fn short_query_tokens_are_ignored() {
        let scorer = QueryScorer::new("an id of 42");
        assert!(scorer.tokens().is_empty());
        assert_eq!(scorer.score("an id of 42"), 0.0);
    }

    #[test]
    fn query_tokens_are_distinct() {
        let scorer = QueryScorer::new("Label label LABEL get-rates /rate/v1");
        let tokens: Vec<&str> = scorer.tokens().iter().map(String::as_str).collect();
        assert_eq!(tokens, vec!["/rate/v1", "get-rates", "label"]);
        // label token (+1), label shared boost (+3)
        assert_eq!(scorer.score("print the label"), 4.0);
    }

    #[test]
    fn boost_terms_double_count_with_token_overlap() {
        // "oauth" scores once as a token and again as a shared boost.
        assert_eq!(score("oauth", "oauth"), 4.0);
    }

    #[test]
    fn score_is_never_negative() {
        for (c, q) in [("", ""), ("x", "y"), ("429 rate limit", "rate limit 429")] {
            assert!(score(c, q) >= 0.0);
        }
    }
}
