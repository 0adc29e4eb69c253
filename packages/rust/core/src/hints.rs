//! Cheap structural hints pulled from pasted SOAP/WSDL text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Cap on namespaces and operations reported.
const MAX_HINTS: usize = 20;

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"xmlns:([a-zA-Z0-9_]+)=["']([^"']+)["']"#).expect("valid regex")
});

static OPERATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"operation\s+name=["']([^"']+)["']"#).expect("valid regex")
});

/// What the SOAP input looks like, passed to the design prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapHints {
    pub has_wsdl: bool,
    pub has_soap_envelope: bool,
    /// Distinct `operation name="..."` values in order of appearance.
    pub possible_operations: Vec<String>,
    /// `prefix=uri` pairs from `xmlns:` declarations.
    pub namespaces: Vec<String>,
}

/// Extract hints from SOAP/WSDL text. Empty input yields empty hints.
pub fn extract_soap_hints(text: &str) -> SoapHints {
    if text.is_empty() {
        return SoapHints::default();
    }

    let lowered = text.to_lowercase();

    let namespaces = NAMESPACE_RE
        .captures_iter(text)
        .map(|c| format!("{}={}", &c[1], &c[2]))
        .take(MAX_HINTS)
        .collect();

    let mut seen = HashSet::new();
    let possible_operations = OPERATION_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .filter(|op| seen.insert(op.clone()))
        .take(MAX_HINTS)
        .collect();

    SoapHints {
        has_wsdl: lowered.contains("wsdl") || lowered.contains("definitions"),
        has_soap_envelope: lowered.contains("soap:envelope") || lowered.contains("<envelope"),
        possible_operations,
        namespaces,
    }
}
