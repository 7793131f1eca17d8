//! Generation service client
//!
//! Success and failure are discriminated at this boundary: a failed
//! generation is an `Error::Generation`, never an error string disguised as
//! a reply.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, Result};

/// Prompt-in, text-out generation service
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply for a prompt
    ///
    /// # Errors
    ///
    /// Returns error if the generation service call fails
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

/// Generation client for Google's Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns error if API key is empty
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Gemini API key required for generation".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(serde::Serialize)]
        struct GenerateRequest<'a> {
            contents: Vec<Content<'a>>,
        }

        #[derive(serde::Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(serde::Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Generation API error {status}: {body}"
            )));
        }

        let body = response.text().await?;
        parse_generate_response(&body)
    }
}

/// Extract the first candidate's first text part from a Gemini response
fn parse_generate_response(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: CandidateContent,
    }

    #[derive(Deserialize)]
    struct CandidateContent {
        #[serde(default)]
        parts: Vec<CandidatePart>,
    }

    #[derive(Deserialize)]
    struct CandidatePart {
        text: String,
    }

    let parsed: GenerateResponse = serde_json::from_str(body)?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| Error::Generation("empty generation response".to_string()))
}
