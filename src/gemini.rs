// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Gemini API client for schema-constrained JSON generation

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::CollaboratorConfig;
use crate::{Result, SpyEdgeError};

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}

impl GeminiClient {
    /// Create a new client from collaborator configuration.
    pub fn new(config: &CollaboratorConfig, api_key: String) -> Result<Self> {
        Self::with_base_url(config, api_key, &config.api_url)
    }

    /// Create a new client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        config: &CollaboratorConfig,
        api_key: String,
        base_url: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Generate a JSON value constrained by `response_schema`.
    ///
    /// Sends one prompt with `responseMimeType: application/json`, extracts the
    /// first candidate's text and parses it as JSON. Any transport failure,
    /// non-success status, empty candidate list or unparseable payload surfaces
    /// as an error; nothing is swallowed at this layer.
    pub async fn generate_structured(&self, prompt: &str, response_schema: Value) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            },
        };

        debug!("Sending request to collaborator: model={}", self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpyEdgeError::CollaboratorUnavailable(format!(
                "collaborator returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        let text = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                SpyEdgeError::MalformedResponse("response carried no candidates".to_string())
            })?;

        serde_json::from_str(&text).map_err(|e| {
            SpyEdgeError::MalformedResponse(format!("candidate text is not valid JSON: {}", e))
        })
    }

    /// Check if the collaborator endpoint is reachable.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1beta/models", self.base_url);

        self.client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                SpyEdgeError::CollaboratorUnavailable(format!(
                    "cannot connect to collaborator at {}: {}",
                    self.base_url, e
                ))
            })?;

        Ok(())
    }

    /// List model names exposed by the collaborator.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1beta/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let models: ModelsResponse = response.json().await?;
        Ok(models.models.into_iter().map(|m| m.name).collect())
    }

    /// Check if the configured model is available.
    pub async fn model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models
            .iter()
            .any(|m| m == model || m.ends_with(&format!("/{}", model))))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
