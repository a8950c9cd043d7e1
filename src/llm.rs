//! Text and image model clients.
//!
//! Both providers speak JSON over HTTPS with a single request per run and a
//! fixed timeout. Response shapes are loose, so extraction walks
//! `serde_json::Value` with explicit fallbacks instead of full typed models.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::{GeminiConfig, OpenAiConfig};

const MODEL_TIMEOUT: Duration = Duration::from_secs(90);

/// Prompt for a fresh post. The model is asked for bare JSON; `parse`
/// handles the cases where it does not comply.
pub fn post_prompt(site_title: &str, topic: &str, word_target: u32) -> String {
    format!(
        "Write a blog post for {site_title}. Topic: {topic}.\n\
         Target length: about {word_target} words.\n\
         Return ONLY valid JSON (no markdown, no code fences, no extra text) \
         with keys: title and body. \
         body must be Markdown and must NOT include an H1 title."
    )
}

/// Prompt for the accompanying image.
pub fn image_prompt(title: &str, topic: &str) -> String {
    format!(
        "A clean, modern illustration for a blog post titled \"{title}\". \
         Topic: {topic}. No text or lettering in the image."
    )
}

/// Seam for the text-generation call, so the pipeline can be exercised
/// without network access.
#[async_trait]
pub trait TextModel {
    /// Returns the raw model text for `prompt`. Empty output is an error.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Inline image bytes returned by the image model.
#[derive(Debug)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

#[derive(Serialize, Debug)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Debug)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Debug)]
struct GeminiPart {
    text: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(MODEL_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    async fn generate_content(&self, model: &str, prompt: &str) -> Result<Value> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
        );
        info!(model, "Calling Gemini generateContent");
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.as_str())
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(%status, "Gemini API returned error");
            bail!("Gemini API error {status}: {body}");
        }
        response
            .json::<Value>()
            .await
            .context("Failed to decode Gemini response JSON")
    }

    /// Generates inline image bytes with the configured image model.
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let payload = self
            .generate_content(&self.config.image_model, prompt)
            .await?;
        for part in candidate_parts(&payload) {
            let Some(inline) = part.get("inline_data").or_else(|| part.get("inlineData")) else {
                continue;
            };
            let mime = inline
                .get("mime_type")
                .or_else(|| inline.get("mimeType"))
                .and_then(|v| v.as_str())
                .unwrap_or("image/png");
            let data = inline
                .get("data")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow!("Gemini image part is missing inline data"))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(data)
                .context("Failed to decode inline image data")?;
            info!(mime, size = bytes.len(), "Decoded generated image");
            return Ok(GeneratedImage {
                bytes,
                extension: extension_for_mime(mime).to_string(),
            });
        }
        bail!("No inline image data in Gemini response")
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let payload = self
            .generate_content(&self.config.text_model, prompt)
            .await?;
        let text = text_from_gemini(&payload);
        if text.is_empty() {
            bail!("Empty response from Gemini text model");
        }
        Ok(text)
    }
}

fn candidate_parts(payload: &Value) -> &[Value] {
    payload
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .map(|parts| parts.as_slice())
        .unwrap_or(&[])
}

/// Concatenates the text parts of the first Gemini candidate.
pub fn text_from_gemini(payload: &Value) -> String {
    let chunks: Vec<&str> = candidate_parts(payload)
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();
    chunks.join("\n").trim().to_string()
}

pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(MODEL_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        info!(model = %self.config.model, "Calling OpenAI responses endpoint");
        let body = serde_json::json!({
            "model": self.config.model,
            "input": prompt,
        });
        let response = self
            .client
            .post("https://api.openai.com/v1/responses")
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(%status, "OpenAI API returned error");
            bail!("OpenAI API error {status}: {body}");
        }
        let payload: Value = response
            .json()
            .await
            .context("Failed to decode OpenAI response JSON")?;
        let text = text_from_openai(&payload);
        if text.is_empty() {
            bail!("Empty response from OpenAI model");
        }
        Ok(text)
    }
}

/// Extracts response text: the convenience `output_text` field when present,
/// otherwise the text parts under `output[].content[]`.
pub fn text_from_openai(payload: &Value) -> String {
    if let Some(text) = payload.get("output_text").and_then(|v| v.as_str()) {
        return text.trim().to_string();
    }
    let mut chunks: Vec<&str> = Vec::new();
    if let Some(output) = payload.get("output").and_then(|v| v.as_array()) {
        for item in output {
            if let Some(content) = item.get("content").and_then(|v| v.as_array()) {
                for part in content {
                    if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                        chunks.push(text);
                    }
                }
            }
        }
    }
    chunks.join("\n").trim().to_string()
}

/// Maps an image MIME type to a filename extension, defaulting to `png`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}
