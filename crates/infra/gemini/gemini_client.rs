use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::error;
use url::Url;

use crate::domain::{
    repositories::ai_gateway::GenerativeAiClient,
    value_objects::{chatbot::GenerationRequest, enums::message_roles::MessageRole},
};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

/// Client for the Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: GeminiContent,
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: text.to_string(),
        }],
    }
}

/// The API names the assistant side `model`.
fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

pub fn build_request(request: &GenerationRequest, config: &GeminiConfig) -> GenerateContentRequest {
    let mut contents: Vec<GeminiContent> = request
        .history
        .iter()
        .map(|turn| text_content(Some(wire_role(turn.role)), &turn.content))
        .collect();
    contents.push(text_content(Some("user"), &request.message));

    GenerateContentRequest {
        system_instruction: text_content(None, &request.system_instruction),
        contents,
        generation_config: GeminiGenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        },
    }
}

/// Text of the first candidate with all of its parts joined, unmodified.
pub fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Gemini response has no candidates"))?;

    let finish_reason = candidate.finish_reason.clone();
    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini candidate has no text (finish_reason={:?})",
                finish_reason
            )
        })?;

    Ok(text)
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build Gemini http client")?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> Result<Url> {
        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );
        Url::parse(&raw).context("invalid Gemini endpoint")
    }

    /// The key travels in a header so it never appears in URLs carried by transport errors.
    fn request(&self, body: &GenerateContentRequest) -> Result<reqwest::Request> {
        let mut api_key =
            HeaderValue::from_str(&self.config.api_key).context("invalid Gemini API key")?;
        api_key.set_sensitive(true);

        self.http
            .post(self.endpoint()?)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .build()
            .map_err(reqwest::Error::without_url)
            .context("failed to build Gemini request")
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {}>", err.without_url()),
        };

        let (api_code, api_status, api_message) =
            match serde_json::from_str::<GeminiErrorEnvelope>(&body) {
                Ok(envelope) => (
                    envelope.error.code,
                    envelope.error.status,
                    envelope.error.message,
                ),
                Err(_) => (None, None, None),
            };

        error!(
            status = %status,
            gemini_error_code = ?api_code,
            gemini_error_status = ?api_status,
            gemini_error_message = ?api_message,
            response_body = %body,
            context = %context,
            "gemini api request failed"
        );

        anyhow::bail!("Gemini API request failed: {} (status {})", context, status);
    }
}

#[async_trait]
impl GenerativeAiClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let body = build_request(&request, &self.config);

        let resp = self
            .http
            .execute(self.request(&body)?)
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to reach Gemini")?;

        let resp = Self::ensure_success(resp, "generate content").await?;
        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to decode Gemini response")?;

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::chatbot::ChatTurn;

    fn config() -> GeminiConfig {
        GeminiConfig {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            api_key: "test-key".to_string(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 1024,
            timeout_secs: 30,
        }
    }

    #[test]
    fn request_maps_history_roles_and_appends_message() {
        let request = GenerationRequest {
            system_instruction: "Be kind".to_string(),
            history: vec![
                ChatTurn {
                    role: MessageRole::User,
                    content: "xin chào".to_string(),
                },
                ChatTurn {
                    role: MessageRole::Assistant,
                    content: "chào bạn".to_string(),
                },
            ],
            message: "mình thấy buồn".to_string(),
        };

        let body = build_request(&request, &config());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be kind");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["role"], "user");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "mình thấy buồn");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn extract_text_joins_every_part() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Mình ở đây "}, {"text": "để lắng nghe bạn."}]},
                "finishReason": "STOP"
            }, {
                "content": {"role": "model", "parts": [{"text": "other candidate"}]}
            }]
        }))
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "Mình ở đây để lắng nghe bạn.");
    }

    #[test]
    fn api_key_is_sent_as_header_not_query() {
        let client = GeminiClient::new(config()).unwrap();
        let body = build_request(
            &GenerationRequest {
                system_instruction: "Be kind".to_string(),
                history: Vec::new(),
                message: "xin chào".to_string(),
            },
            &client.config,
        );

        let request = client.request(&body).unwrap();

        assert_eq!(request.url().query(), None);
        assert!(!request.url().as_str().contains("test-key"));
        assert_eq!(request.headers()[API_KEY_HEADER], "test-key");
        assert!(request.headers()[API_KEY_HEADER].is_sensitive());
    }

    #[tokio::test]
    async fn transport_errors_do_not_carry_the_key() {
        let client = GeminiClient::new(GeminiConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            api_key: "SUPERSECRETKEY".to_string(),
            timeout_secs: 2,
            ..config()
        })
        .unwrap();

        let err = client
            .generate(GenerationRequest {
                system_instruction: "Be kind".to_string(),
                history: Vec::new(),
                message: "xin chào".to_string(),
            })
            .await
            .unwrap_err();

        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
        assert!(!format!("{:#}", err).contains("SUPERSECRETKEY"));
    }

    #[test]
    fn extract_text_fails_without_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(extract_text(response).is_err());

        let blocked: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(extract_text(blocked).is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn generate_against_live_api() {
        dotenvy::dotenv().ok();
        let Ok(api_key) = std::env::var("GEMINI_API_KEY") else {
            return;
        };
        let client = GeminiClient::new(GeminiConfig {
            api_key,
            ..config()
        })
        .unwrap();

        let reply = client
            .generate(GenerationRequest {
                system_instruction: "Answer in one short sentence.".to_string(),
                history: Vec::new(),
                message: "Hello".to_string(),
            })
            .await
            .unwrap();

        assert!(!reply.is_empty());
    }
}
