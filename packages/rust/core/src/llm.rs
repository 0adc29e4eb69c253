//! Model client for the generation stages.
//!
//! [`ModelClient`] is the seam the conversion pipeline talks to;
//! [`GeminiClient`] implements it over the Gemini `generateContent` REST API.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use soapbridge_shared::{GeminiConfig, Result, SoapBridgeError};

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("SoapBridge/", env!("CARGO_PKG_VERSION"));

/// Models offered by the CLI.
pub const SUPPORTED_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-flash-lite"];

/// A text-generation backend.
pub trait ModelClient: Send + Sync {
    /// Model identifier, recorded in run manifests.
    fn model(&self) -> &str;

    /// Generate a reply for one system + user prompt pair. An empty reply is
    /// `Ok("")`, not an error.
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// [`ModelClient`] backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client. The API key is passed in; this crate never reads the
    /// environment.
    pub fn new(
        config: &GeminiConfig,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let model = model.into();
        let mut base = Url::parse(&config.base_url).map_err(|e| {
            SoapBridgeError::config(format!("invalid gemini base_url '{}': {e}", config.base_url))
        })?;
        // keep any proxy path prefix when joining
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| SoapBridgeError::config(format!("invalid model name '{model}': {e}")))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SoapBridgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            model,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ModelClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: format!("{system_prompt}\n\nUSER_INPUT:\n{user_prompt}"),
                }],
            }],
        };

        debug!(prompt_chars = user_prompt.len(), "sending generateContent request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SoapBridgeError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SoapBridgeError::Model(format!(
                "HTTP {status} from {}: {}",
                self.model,
                detail.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SoapBridgeError::Model(format!("invalid generateContent response: {e}")))?;

        let text = parsed.text();
        debug!(reply_chars = text.len(), "generateContent reply received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn endpoint_is_built_from_base_and_model() {
        let client = GeminiClient::new(
            &config("https://generativelanguage.googleapis.com"),
            "gemini-2.5-flash",
            "k",
        )
        .unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = GeminiClient::new(&config("not a url"), "gemini-2.5-flash", "k").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[tokio::test]
    async fn generate_sends_prompt_and_joins_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": "SYSTEM\n\nUSER_INPUT:\nUSER" }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "1) Assumptions\n" }, { "text": "none" }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri()), "gemini-2.5-flash", "test-key")
            .unwrap();
        let reply = client.generate("SYSTEM", "USER").await.unwrap();
        assert_eq!(reply, "1) Assumptions\nnone");
    }

    #[tokio::test]
    async fn missing_candidates_yield_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client =
            GeminiClient::new(&config(&server.uri()), "gemini-2.5-flash-lite", "k").unwrap();
        assert_eq!(client.generate("s", "u").await.unwrap(), "");
    }

    #[tokio::test]
    async fn error_status_is_a_model_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("{\"error\":\"RESOURCE_EXHAUSTED\"}"),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri()), "gemini-2.5-flash", "k").unwrap();
        let err = client.generate("s", "u").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("model error"));
        assert!(msg.contains("429"));
        assert!(msg.contains("RESOURCE_EXHAUSTED"));
    }
}
