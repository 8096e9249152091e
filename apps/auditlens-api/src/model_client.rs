//! Model provider seam
//!
//! The orchestration workflow only needs "given images + instructions,
//! return freeform text". [`ModelClient`] is that seam; the production
//! implementation talks to the Anthropic Messages API, and tests substitute
//! a canned client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// One image in a transmissible form: embedded bytes for local files,
/// by-reference for remote URLs.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Base64 { media_type: String, data: String },
    Url(String),
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Submit the images with a fixed system instruction and user prompt;
    /// return the model's freeform text response.
    async fn analyze(
        &self,
        images: &[ImageInput],
        system: &str,
        prompt: &str,
    ) -> Result<String>;
}

/// Production client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ImageSource {
    Base64 { media_type: String, data: String },
    Url { url: String },
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn analyze(
        &self,
        images: &[ImageInput],
        system: &str,
        prompt: &str,
    ) -> Result<String> {
        let mut content: Vec<ContentBlock> = images
            .iter()
            .map(|image| ContentBlock::Image {
                source: match image {
                    ImageInput::Base64 { media_type, data } => ImageSource::Base64 {
                        media_type: media_type.clone(),
                        data: data.clone(),
                    },
                    ImageInput::Url(url) => ImageSource::Url { url: url.clone() },
                },
            })
            .collect();
        content.push(ContentBlock::Text {
            text: prompt.to_string(),
        });

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("sending model request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("model provider returned {}: {}", status, body);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .context("decoding model response")?;

        body.content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .context("no text block in model response")
    }
}

/// Media type inferred from a URL's extension. Anything unrecognized is
/// treated as JPEG, matching the upload whitelist.
pub fn media_type(url: &str) -> &'static str {
    if url.ends_with(".png") {
        "image/png"
    } else if url.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
