// src/analysis/client.rs
//! External Analysis Client
//!
//! Thin request/response wrapper around the Gemini `generateContent` REST
//! endpoint.
//!
//! ## Responsibilities
//!
//! - Build the request body (prompt, inline images, response schema, tools)
//! - Send it with the caller's credential
//! - Strip code fences from the returned text and parse it into the shared types
//! - Collect citations from grounding metadata
//!
//! Any failure is logged here with its cause and returned as a short
//! [`AnalysisError`] scoped to the request.

use bevy::log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::backend::{
    require_credential, AnalysisBackend, BoxFut, ComponentOutcome, Credential, MethodOutcome,
};
use super::error::{AnalysisError, ServiceError};
use super::input::{ComponentInput, ComponentSource};
use super::prompt;
use super::schema::{self, ComponentAnalysis, Reference, UnifiedMethod};

/// Connection and model settings for [`GeminiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub model_id: String,
    pub curve_model_id: String,
    pub grounding_with_google_search: bool,
    pub output_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model_id: "gemini-2.5-flash".to_string(),
            curve_model_id: "gemini-2.5-flash".to_string(),
            grounding_with_google_search: true,
            output_language: "Simplified Chinese".to_string(),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part<'a> {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ResponseInlineData>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

// ============================================================================
// Response helpers
// ============================================================================

/// Removes markdown code-fence decoration the model sometimes wraps JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .take(1)
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated answer text (thought parts skipped), fences stripped.
    pub(crate) fn text(&self) -> Result<String, ServiceError> {
        let raw: String = self
            .parts()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect();
        let cleaned = strip_code_fences(&raw);
        if cleaned.is_empty() {
            Err(ServiceError::EmptyResponse)
        } else {
            Ok(cleaned)
        }
    }

    /// Citations with a non-empty URI. A blank title falls back to the URI.
    pub(crate) fn references(&self) -> Vec<Reference> {
        self.candidates
            .iter()
            .take(1)
            .filter_map(|c| c.grounding_metadata.as_ref())
            .flat_map(|m| m.grounding_chunks.iter())
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.as_deref().map(str::trim).unwrap_or("");
                if uri.is_empty() {
                    return None;
                }
                let title = web
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(uri);
                Some(Reference { title: title.to_string(), uri: uri.to_string() })
            })
            .collect()
    }

    pub(crate) fn first_image(&self) -> Result<String, ServiceError> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.mime_type.starts_with("image/") && !d.data.is_empty())
            .map(|d| d.data.clone())
            .ok_or(ServiceError::MissingImage)
    }
}

pub(crate) fn parse_structured<T: serde::de::DeserializeOwned>(
    response: &GenerateContentResponse,
) -> Result<T, ServiceError> {
    let text = response.text()?;
    Ok(serde_json::from_str(&text)?)
}

// ============================================================================
// Request building
// ============================================================================

fn image_parts(inputs: &[ComponentInput]) -> impl Iterator<Item = Part<'_>> {
    inputs.iter().filter_map(|input| match &input.source {
        ComponentSource::Image(image) => Some(Part::Inline {
            inline_data: InlineData { mime_type: &image.mime_type, data: &image.data },
        }),
        ComponentSource::Smiles(_) => None,
    })
}

impl ClientConfig {
    /// Request asking for JSON matching `schema`. With search grounding the
    /// schema travels inside the prompt, because the service does not accept
    /// structured output and the search tool together.
    pub(crate) fn structured_request<'a>(
        &self,
        prompt_text: String,
        inputs: &'a [ComponentInput],
        schema: Value,
    ) -> GenerateContentRequest<'a> {
        let (text, generation_config, tools) = if self.grounding_with_google_search {
            (
                prompt_text + &prompt::inline_schema_instruction(&schema),
                None,
                vec![json!({ "googleSearch": {} })],
            )
        } else {
            (
                prompt_text,
                Some(GenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: schema,
                }),
                Vec::new(),
            )
        };
        self.request(text, inputs, generation_config, tools)
    }

    pub(crate) fn curve_request<'a>(&self, input: &'a ComponentInput) -> GenerateContentRequest<'a> {
        self.request(
            prompt::curve_prompt(input),
            std::slice::from_ref(input),
            None,
            vec![json!({ "codeExecution": {} })],
        )
    }

    fn request<'a>(
        &self,
        text: String,
        inputs: &'a [ComponentInput],
        generation_config: Option<GenerationConfig>,
        tools: Vec<Value>,
    ) -> GenerateContentRequest<'a> {
        let mut parts = vec![Part::Text { text }];
        parts.extend(image_parts(inputs));
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text { text: prompt::system_instruction(&self.output_language) }],
            },
            contents: vec![Content { role: Some("user"), parts }],
            generation_config,
            tools,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    async fn generate(
        &self,
        model_id: &str,
        credential: &Credential,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, ServiceError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            model_id
        );
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }
        if body.trim().is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_unified_method(
        &self,
        credential: &Credential,
        inputs: &[ComponentInput],
    ) -> Result<MethodOutcome, ServiceError> {
        let request = self.config.structured_request(
            prompt::unified_method_prompt(inputs),
            inputs,
            schema::unified_method_schema(),
        );
        let response = self.generate(&self.config.model_id, credential, &request).await?;
        let method: UnifiedMethod = parse_structured(&response)?;
        Ok(MethodOutcome { method, references: response.references() })
    }

    async fn fetch_component(
        &self,
        credential: &Credential,
        input: &ComponentInput,
    ) -> Result<ComponentOutcome, ServiceError> {
        let request = self.config.structured_request(
            prompt::component_prompt(input),
            std::slice::from_ref(input),
            schema::component_schema(),
        );
        let response = self.generate(&self.config.model_id, credential, &request).await?;
        let mut analysis: ComponentAnalysis = parse_structured(&response)?;
        analysis.component_id = input.display_id.clone();
        Ok(ComponentOutcome { analysis, references: response.references() })
    }

    async fn fetch_curve(
        &self,
        credential: &Credential,
        input: &ComponentInput,
    ) -> Result<String, ServiceError> {
        let request = self.config.curve_request(input);
        let response = self.generate(&self.config.curve_model_id, credential, &request).await?;
        response.first_image()
    }
}

impl AnalysisBackend for GeminiClient {
    fn unified_method<'a>(
        &'a self,
        credential: Option<&'a Credential>,
        inputs: &'a [ComponentInput],
    ) -> BoxFut<'a, Result<MethodOutcome, AnalysisError>> {
        Box::pin(async move {
            let credential = require_credential(credential)?;
            info!("Requesting unified method for {} component(s)", inputs.len());
            self.fetch_unified_method(credential, inputs).await.map_err(|e| {
                error!("Unified method request failed: {}", e);
                AnalysisError::unified_method()
            })
        })
    }

    fn component_analysis<'a>(
        &'a self,
        credential: Option<&'a Credential>,
        input: &'a ComponentInput,
    ) -> BoxFut<'a, Result<ComponentOutcome, AnalysisError>> {
        Box::pin(async move {
            let credential = require_credential(credential)?;
            info!("Requesting analysis for {}", input.display_id);
            self.fetch_component(credential, input).await.map_err(|e| {
                error!("Analysis request for {} failed: {}", input.display_id, e);
                AnalysisError::component(&input.display_id)
            })
        })
    }

    fn curve_image<'a>(
        &'a self,
        credential: Option<&'a Credential>,
        input: &'a ComponentInput,
    ) -> BoxFut<'a, Result<String, AnalysisError>> {
        Box::pin(async move {
            let credential = require_credential(credential)?;
            info!("Requesting pH-logD curve for {}", input.display_id);
            self.fetch_curve(credential, input).await.map_err(|e| {
                error!("Curve request for {} failed: {}", input.display_id, e);
                AnalysisError::curve(&input.display_id)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::input::normalize_inputs;
    use crate::analysis::input::tests::encoded;

    fn response(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_text_skips_thoughts_and_rejects_empty() {
        let r = response(json!({"candidates": [{"content": {"parts": [
            {"text": "thinking...", "thought": true},
            {"text": "```json\n{\"x\": 1}"},
            {"text": "\n```"}
        ]}}]}));
        assert_eq!(r.text().unwrap(), "{\"x\": 1}");

        let empty = response(json!({"candidates": [{"content": {"parts": [{"text": "```"}]}}]}));
        assert!(matches!(empty.text(), Err(ServiceError::EmptyResponse)));
        let none = response(json!({}));
        assert!(matches!(none.text(), Err(ServiceError::EmptyResponse)));
    }

    #[test]
    fn test_references_keep_only_non_empty_uris() {
        let r = response(json!({"candidates": [{
            "content": {"parts": [{"text": "{}"}]},
            "groundingMetadata": {"groundingChunks": [
                {"web": {"uri": "https://a.example", "title": "A"}},
                {"web": {"uri": "", "title": "no uri"}},
                {"web": {"title": "missing uri"}},
                {"retrievedContext": {}},
                {"web": {"uri": "https://b.example", "title": "  "}}
            ]}
        }]}));
        assert_eq!(
            r.references(),
            vec![
                Reference { title: "A".into(), uri: "https://a.example".into() },
                Reference { title: "https://b.example".into(), uri: "https://b.example".into() },
            ]
        );
    }

    #[test]
    fn test_first_image_picks_inline_png() {
        let r = response(json!({"candidates": [{"content": {"parts": [
            {"executableCode": {"code": "plt.plot()"}},
            {"inlineData": {"mimeType": "text/plain", "data": "eA=="}},
            {"inlineData": {"mimeType": "image/png", "data": "iVBORw0K"}}
        ]}}]}));
        assert_eq!(r.first_image().unwrap(), "iVBORw0K");
        let none = response(json!({"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]}));
        assert!(matches!(none.first_image(), Err(ServiceError::MissingImage)));
    }

    #[test]
    fn test_structured_request_without_grounding_sends_schema() {
        let config = ClientConfig { grounding_with_google_search: false, ..ClientConfig::default() };
        let inputs = normalize_inputs("CCO", &[encoded("a.png")]).unwrap();
        let body = serde_json::to_value(config.structured_request(
            "prompt".into(),
            &inputs,
            schema::unified_method_schema(),
        ))
        .unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body.get("tools").is_none());
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "prompt");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert!(body["systemInstruction"]["parts"][0]["text"].is_string());
    }

    #[test]
    fn test_grounded_request_moves_schema_into_prompt() {
        let config = ClientConfig::default();
        let inputs = normalize_inputs("CCO", &[]).unwrap();
        let body = serde_json::to_value(config.structured_request(
            "prompt".into(),
            &inputs,
            schema::component_schema(),
        ))
        .unwrap();

        assert!(body.get("generationConfig").is_none());
        assert_eq!(body["tools"], json!([{ "googleSearch": {} }]));
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("prompt"));
        assert!(text.contains("basicProfile"));
    }

    #[test]
    fn test_parse_structured_component() {
        let analysis = crate::analysis::schema::tests::sample_component("Component 1 (SMILES)");
        let text = format!("```json\n{}\n```", serde_json::to_string(&analysis).unwrap());
        let r = response(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}));
        let parsed: ComponentAnalysis = parse_structured(&r).unwrap();
        assert_eq!(parsed, analysis);

        let bad = response(json!({"candidates": [{"content": {"parts": [{"text": "{\"nope\": 1}"}]}}]}));
        assert!(matches!(parse_structured::<ComponentAnalysis>(&bad), Err(ServiceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        // Unroutable base URL: reaching the network would surface as an
        // Analysis error, not Auth.
        let client = GeminiClient::new(ClientConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            ..ClientConfig::default()
        });
        let inputs = normalize_inputs("CCO", &[]).unwrap();
        assert_eq!(client.unified_method(None, &inputs).await, Err(AnalysisError::Auth));
        assert_eq!(
            client.component_analysis(None, &inputs[0]).await.map(|_| ()),
            Err(AnalysisError::Auth)
        );
        assert_eq!(client.curve_image(None, &inputs[0]).await, Err(AnalysisError::Auth));
    }
}
