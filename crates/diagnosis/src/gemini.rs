//! Gemini diagnosis provider.
//!
//! Calls `models/{model}:generateContent` with a JSON response schema and
//! parses the first candidate's text as an [`AiDiagnosis`].

use std::time::Duration;

use async_trait::async_trait;
use domain::{AiDiagnosis, DiagnosisRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::prompt::{build_prompt, parse_diagnosis, response_schema};
use crate::service::DiagnosisService;
use crate::{DiagnosisError, Result};

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Request timeout. None keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Diagnosis service backed by Google's Gemini API.
pub struct GeminiDiagnosisService {
    config: GeminiConfig,
    client: Client,
}

impl GeminiDiagnosisService {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DiagnosisError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl DiagnosisService for GeminiDiagnosisService {
    fn provider(&self) -> &'static str {
        "gemini"
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<AiDiagnosis> {
        if self.config.api_key.trim().is_empty() {
            return Err(DiagnosisError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        tracing::debug!(
            model = %self.config.model,
            vehicle = %request.vehicle_model,
            "sending diagnosis request to Gemini"
        );

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DiagnosisError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let answer: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| DiagnosisError::InvalidResponse(e.to_string()))?;
        parse_diagnosis(&answer.text()?)
    }
}

// Gemini API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Result<String> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| DiagnosisError::InvalidResponse("no candidates".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(DiagnosisError::ContentFiltered);
        }

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect();
        Ok(text)
    }
}
