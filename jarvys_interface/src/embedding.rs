//! Embedding provider client. Opaque contract: text in, vector or failure
//! out. Callers never fail a write because this failed.

use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::error::SourceError;

const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

pub struct EmbeddingClient {
    http: Client,
    url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Option<Self> {
        let http = ClientBuilder::new().timeout(timeout).build().ok()?;
        let url = format!("{}/embeddings", base_url.trim_end_matches('/'));
        Some(Self { http, url, api_key })
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, SourceError> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": EMBEDDING_MODEL, "input": text }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Unreachable(format!(
                "embedding provider returned {}",
                resp.status()
            )));
        }
        let parsed: EmbeddingResponse = resp.json().await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| SourceError::Malformed("empty embedding response".to_string()))
    }
}
