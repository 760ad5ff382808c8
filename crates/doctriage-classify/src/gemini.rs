//! Gemini `generateContent` primary classifier.

use async_trait::async_trait;
use doctriage_core::ClassifierConfig;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::classifier::{ClassifierOutput, PrimaryClassifier};
use crate::error::{ClassifyError, Result};

/// Header carrying the API key; keeps the credential out of request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Primary classifier backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClassifier {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<Secret<String>>,
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Builder for creating a GeminiClassifier
#[derive(Default)]
pub struct GeminiClassifierBuilder {
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Blank keys are treated as absent.
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// HTTP-level timeout; the pipeline applies its own bound on top.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<GeminiClassifier> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let http = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(30)))
            .user_agent(format!("doctriage/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GeminiClassifier {
            http,
            base_url,
            model: self.model.unwrap_or_else(|| "gemini-pro".to_string()),
            api_key: self.api_key.map(Secret::new),
        })
    }
}

impl GeminiClassifier {
    pub fn builder() -> GeminiClassifierBuilder {
        GeminiClassifierBuilder::new()
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .model(config.model.clone())
            .api_key(Some(config.api_key.clone()))
            .timeout(config.timeout());
        if let Some(base_url) = &config.base_url {
            builder = builder.base_url(base_url.clone());
        }
        builder.build()
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn build_prompt(text: &str, file_name: &str) -> String {
    format!(
        r#"
Analyze the following document text and provide a structured JSON response with EXACTLY these fields:

Document Text: "{text}"
File Name: "{file_name}"

You must respond with ONLY a valid JSON object in this exact format:
{{
  "category": "one of: Engineering, Finance, Procurement, HR, Legal, Safety, Regulatory, Internal, Reports, Other",
  "priority": "one of: High, Medium, Low",
  "summary": "A factual 2-3 sentence summary based STRICTLY on the actual document content."
}}

Rules:
1. Base your analysis ONLY on the actual text content provided
2. Do not make assumptions or add information that is not in the text
3. The summary must reflect specific content from the document
4. Use exact category names from the list
5. Priority should be based on urgency indicators in the text
6. Respond with ONLY the JSON object, no other text
"#
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

#[async_trait]
impl PrimaryClassifier for GeminiClassifier {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn classify(&self, text: &str, file_name: &str) -> Result<ClassifierOutput> {
        let api_key = self.api_key.as_ref().ok_or(ClassifyError::MissingCredential)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(text, file_name)),
                }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key.expose_secret().as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                ClassifyError::malformed(format!("unexpected response body: {}", e.without_url()))
            })?;

        let reply = body
            .first_text()
            .ok_or_else(|| ClassifyError::malformed("response has no candidate text"))?;

        debug!(reply_len = reply.len(), "Received classifier reply");

        ClassifierOutput::from_model_reply(reply)
    }
}
