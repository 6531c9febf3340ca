/// Google Gemini text generation provider
///
/// Calls `v1beta/models/{model}:generateContent` and returns the text of the
/// first candidate. Any failure to obtain text (transport error, timeout,
/// error status, blocked or empty candidate) is a provider error; judging the
/// text itself is left to the suggestion parser.
use crate::{
    error::AppResult,
    services::providers::{GenerationError, GenerativeService, ResponseFormat},
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
        })
    }
}

fn build_request(prompt: &str, format: ResponseFormat) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 50,
            max_output_tokens: 2048,
            response_mime_type: match format {
                ResponseFormat::Json => Some("application/json"),
                ResponseFormat::Text => None,
            },
        },
        safety_settings: SAFETY_CATEGORIES
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold: "BLOCK_ONLY_HIGH",
            })
            .collect(),
    }
}

/// Joins the text parts of the first candidate
fn extract_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl GenerativeService for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        format: ResponseFormat,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt, format))
            .send()
            .await
            .map_err(|e| GenerationError::Provider(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Gemini returned an error status");
            return Err(GenerationError::Provider(format!(
                "Gemini returned status {}",
                status
            )));
        }

        let payload: GenerateResponse = response.json().await.map_err(|e| {
            GenerationError::Provider(format!("Failed to decode Gemini response: {}", e))
        })?;

        let text = extract_text(payload).ok_or_else(|| {
            GenerationError::Provider("Gemini response contained no text".to_string())
        })?;

        tracing::debug!(model = %self.model, chars = text.len(), "Gemini completion received");

        Ok(text)
    }
}
