//! Fixed system prompts and user-prompt templates for the two generation
//! stages.

use std::sync::LazyLock;

use regex::Regex;

use soapbridge_shared::TargetStack;

use crate::hints::SoapHints;

/// System prompt for the SOAP → REST design stage.
pub const DESIGN_SYSTEM_PROMPT: &str = "
You are a migration assistant converting SOAP services to REST APIs.

Rules:
- First produce an OpenAPI 3.0 specification (YAML).
- Then describe REST endpoints, schemas, and errors.
- Provide a SOAP → REST mapping table.
- Map SOAP Faults to HTTP status codes with a JSON error body.
- If something is missing, list assumptions explicitly.
- Prefer correctness and clarity over verbosity.

Output sections (exact order):
1) Assumptions
2) REST Endpoints
3) JSON Schemas
4) Error Model
5) SOAP → REST Mapping Table
6) OpenAPI 3.0 YAML
";

/// System prompt for the client code stage.
pub const CODE_SYSTEM_PROMPT: &str = "
You are a code generator.

Given an OpenAPI 3.0 YAML and migration notes:
- Generate ONLY a client (NO server code)
- Include TODOs for business logic
- Include example requests

Rules:
- Code must match the OpenAPI exactly
- No secrets or API keys in code
- Keep code minimal but runnable

Output sections:
1) Client Skeleton
2) Example Requests
3) Validation Notes & Tests
";

/// Heading that introduces the reference context pack in both prompts.
pub const REFERENCE_HEADING: &str =
    "AUTHORITATIVE REFERENCE (uploaded files; treat as source of truth):";

static OPENAPI_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)6\)\s*OpenAPI 3\.0 YAML(.*)$").expect("valid regex")
});

/// User prompt for the design stage.
pub fn build_design_prompt(
    target_stack: TargetStack,
    soap_text: &str,
    hints: &SoapHints,
    rest_preferences: &str,
    context: &str,
) -> String {
    format!(
        "
Target stack:
{stack}

REST preferences:
{rest_preferences}

{REFERENCE_HEADING}
{context}

SOAP / WSDL / XML / Code:
{soap_text}

Extracted hints:
- has_wsdl: {has_wsdl}
- has_soap_envelope: {has_envelope}
- namespaces: {namespaces}
- possible_operations: {operations}

Task:
Design a REST API equivalent and produce OpenAPI 3.0 YAML.
",
        stack = target_stack.label(),
        has_wsdl = hints.has_wsdl,
        has_envelope = hints.has_soap_envelope,
        namespaces = render_list(&hints.namespaces),
        operations = render_list(&hints.possible_operations),
    )
}

/// User prompt for the client code stage.
pub fn build_code_prompt(
    target_stack: TargetStack,
    openapi_yaml: &str,
    design_output: &str,
    context: &str,
) -> String {
    format!(
        "
Target stack:
{stack}

{REFERENCE_HEADING}
{context}

OpenAPI 3.0 YAML:
{openapi_yaml}

Design notes:
{design_output}

Generate ONLY the client code (no server).
",
        stack = target_stack.label(),
    )
}

/// Best-effort extraction of the OpenAPI section from the design output.
/// Falls back to the whole output when the section heading is missing.
pub fn extract_openapi_section(design_output: &str) -> String {
    match OPENAPI_SECTION_RE.captures(design_output) {
        Some(caps) => caps[1].trim().to_string(),
        None => design_output.to_string(),
    }
}

fn render_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
