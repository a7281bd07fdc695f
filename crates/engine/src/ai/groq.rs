//! Groq provider (fallback). Also handles voice transcription via Whisper.

use serde::Deserialize;
use serde_json::json;

use crate::ProviderError;

use super::{ImageData, Provider};

const BASE_URL: &str = "https://api.groq.com/openai/v1";
const TEXT_MODEL: &str = "llama-3.3-70b-versatile";
const VISION_MODEL: &str = "llama-3.2-90b-vision-preview";
const WHISPER_MODEL: &str = "whisper-large-v3-turbo";

#[derive(Clone, Debug)]
pub struct GroqProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl GroqProvider {
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point at a different API host. Used by tests against a local stub.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ProviderError::Api { status, message })
    }
}

impl Provider for GroqProvider {
    fn name(&self) -> &'static str {
        "Groq Llama"
    }

    async fn generate(
        &self,
        prompt: &str,
        text: &str,
        image: Option<&ImageData>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut content = vec![json!({
            "type": "text",
            "text": format!("{prompt}\nINPUT USER:\n{text}"),
        })];
        let model = match image {
            Some(image) => {
                content.push(json!({
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:{};base64,{}", image.mime_type, image.to_base64()),
                    }
                }));
                VISION_MODEL
            }
            None => TEXT_MODEL,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": model,
                "messages": [{ "role": "user", "content": content }],
                "temperature": 0,
                "response_format": { "type": "json_object" },
            }))
            .send()
            .await?;

        let body: ChatResponse = Self::check(response).await?.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let part = reqwest::multipart::Part::bytes(audio).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", WHISPER_MODEL);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let body: TranscriptionResponse = Self::check(response).await?.json().await?;
        Ok(body.text)
    }
}
