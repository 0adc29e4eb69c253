//! End-to-end conversion: SOAP text + references → design → OpenAPI → client code.

use std::time::Instant;

use tracing::{info, instrument};

use soapbridge_shared::{ReferenceDocument, RetrievalConfig, Result, SoapBridgeError, TargetStack};

use crate::assembler::ContextAssembler;
use crate::hints::{SoapHints, extract_soap_hints};
use crate::llm::ModelClient;
use crate::prompt::{
    CODE_SYSTEM_PROMPT, DESIGN_SYSTEM_PROMPT, build_code_prompt, build_design_prompt,
    extract_openapi_section,
};

/// Inputs for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    /// Pasted SOAP XML / WSDL / SOAP code; also the retrieval query.
    pub soap_text: String,
    pub target_stack: TargetStack,
    /// Free-form REST preferences (may be empty).
    pub rest_preferences: String,
}

/// Everything a conversion run produced.
#[derive(Debug, Clone)]
pub struct ConvertOutput {
    pub hints: SoapHints,
    /// Rendered context pack; empty when no references were given.
    pub context: String,
    /// Number of chunks in the context pack.
    pub context_chunks: usize,
    pub design: String,
    pub openapi_yaml: String,
    pub code: String,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, output: &ConvertOutput);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _output: &ConvertOutput) {}
}

/// Run the full conversion.
///
/// 1. Extract SOAP hints
/// 2. Build the reference context pack (SOAP text is the query)
/// 3. Design stage: REST design + OpenAPI
/// 4. Pull the OpenAPI section out of the design
/// 5. Code stage: client code
#[instrument(skip_all, fields(model = %client.model(), references = documents.len()))]
pub async fn convert<M: ModelClient>(
    request: &ConvertRequest,
    documents: &[ReferenceDocument],
    assembler: &ContextAssembler,
    client: &M,
    progress: &dyn ProgressReporter,
) -> Result<ConvertOutput> {
    if request.soap_text.trim().is_empty() {
        return Err(SoapBridgeError::validation(
            "no SOAP/WSDL content provided; paste some SOAP first",
        ));
    }

    let start = Instant::now();

    progress.phase("Analyzing SOAP");
    let hints = extract_soap_hints(&request.soap_text);
    info!(
        has_wsdl = hints.has_wsdl,
        has_soap_envelope = hints.has_soap_envelope,
        operations = hints.possible_operations.len(),
        "SOAP hints extracted"
    );

    progress.phase("Building reference context");
    let pack = assembler.select(documents, &request.soap_text);
    let context = pack.render();

    progress.phase("Designing REST API + OpenAPI");
    let design_prompt = build_design_prompt(
        request.target_stack,
        &request.soap_text,
        &hints,
        &request.rest_preferences,
        &context,
    );
    let design = client.generate(DESIGN_SYSTEM_PROMPT, &design_prompt).await?;
    let openapi_yaml = extract_openapi_section(&design);

    progress.phase("Generating client code");
    let code_prompt = build_code_prompt(request.target_stack, &openapi_yaml, &design, &context);
    let code = client.generate(CODE_SYSTEM_PROMPT, &code_prompt).await?;

    let output = ConvertOutput {
        hints,
        context,
        context_chunks: pack.len(),
        design,
        openapi_yaml,
        code,
        elapsed: start.elapsed(),
    };

    info!(
        context_chunks = output.context_chunks,
        design_chars = output.design.len(),
        code_chars = output.code.len(),
        elapsed_ms = output.elapsed.as_millis() as u64,
        "conversion complete"
    );
    progress.done(&output);

    Ok(output)
}

/// Convenience constructor for the common case of config-driven retrieval.
pub fn default_assembler(config: RetrievalConfig) -> ContextAssembler {
    ContextAssembler::new(soapbridge_normalize::Normalizer::with_default_extractor(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use soapbridge_normalize::Normalizer;

    /// Returns canned replies in order and records every prompt pair.
    struct ScriptedModel {
        replies: Mutex<Vec<String>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelClient for ScriptedModel {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            Ok(self.replies.lock().unwrap().pop().unwrap_or_default())
        }
    }

    struct FailingModel;

    impl ModelClient for FailingModel {
        fn model(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
            Err(SoapBridgeError::Model("HTTP 503".into()))
        }
    }

    fn request(soap: &str) -> ConvertRequest {
        ConvertRequest {
            soap_text: soap.to_string(),
            target_stack: TargetStack::JavaHttp,
            rest_preferences: "idempotency keys".to_string(),
        }
    }

    fn assembler() -> ContextAssembler {
        ContextAssembler::new(Normalizer::new(None), RetrievalConfig::default())
    }

    const SOAP: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body><ProcessShipmentRequest><RequestedShipment/></ProcessShipmentRequest></soap:Body>
</soap:Envelope>"#;

    #[tokio::test]
    async fn convert_runs_both_stages_with_context() {
        let model = ScriptedModel::new(&[
            "1) Assumptions\nnone\n6) OpenAPI 3.0 YAML\nopenapi: 3.0.0\n",
            "import java.net.http.HttpClient;",
        ]);
        let docs = vec![
            ReferenceDocument::new("ship.txt", b"POST /ship/v1/shipments creates a shipment".to_vec())
                .unwrap(),
        ];

        let output = convert(&request(SOAP), &docs, &assembler(), &model, &SilentProgress)
            .await
            .unwrap();

        assert!(output.hints.has_soap_envelope);
        assert_eq!(output.context_chunks, 1);
        assert!(output.context.starts_with("[SOURCE FILE: ship.txt]\n"));
        assert_eq!(output.openapi_yaml, "openapi: 3.0.0");
        assert_eq!(output.code, "import java.net.http.HttpClient;");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        let (design_system, design_user) = &calls[0];
        assert_eq!(design_system, DESIGN_SYSTEM_PROMPT);
        assert!(design_user.contains("Java HTTP client"));
        assert!(design_user.contains("idempotency keys"));
        assert!(design_user.contains("[SOURCE FILE: ship.txt]"));
        assert!(design_user.contains("ProcessShipmentRequest"));

        let (code_system, code_user) = &calls[1];
        assert_eq!(code_system, CODE_SYSTEM_PROMPT);
        assert!(code_user.contains("OpenAPI 3.0 YAML:\nopenapi: 3.0.0\n"));
        assert!(code_user.contains("[SOURCE FILE: ship.txt]"));
    }

    #[tokio::test]
    async fn convert_without_references_has_empty_context() {
        let model = ScriptedModel::new(&["design only", "code"]);
        let output = convert(&request(SOAP), &[], &assembler(), &model, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(output.context, "");
        assert_eq!(output.context_chunks, 0);
        // no OpenAPI heading → whole design is used
        assert_eq!(output.openapi_yaml, "design only");
    }

    #[tokio::test]
    async fn blank_soap_text_is_rejected_before_any_model_call() {
        let model = ScriptedModel::new(&["unused"]);
        let err = convert(&request("  \n "), &[], &assembler(), &model, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, SoapBridgeError::Validation { .. }));
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let err = convert(&request(SOAP), &[], &assembler(), &FailingModel, &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
