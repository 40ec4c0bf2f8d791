use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::classifier::remote::TextGenerator;
use crate::config::GeminiConfig;
use crate::errors::{MirrorError, Result};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Google Generative Language text completion client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MirrorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: GenerateResponse = resp.json().await?;
        first_text(data)
    }
}

fn first_text(data: GenerateResponse) -> Result<String> {
    data.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| MirrorError::Parse("no text in generateContent response".to_string()))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_text(prompt).await
    }
}
