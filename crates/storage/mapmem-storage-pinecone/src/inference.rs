//! Hosted embedding generation via the Pinecone inference API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mapmem_core::{EmbeddingMode, EmbeddingProvider, MapMemError, Result};

use crate::{api_client, PineconeConfig};

/// Truncation strategy for over-length inputs: the service clips the tail
/// rather than rejecting the request
const TRUNCATE: &str = "END";

/// Embedding provider backed by Pinecone's hosted inference API
pub struct PineconeInference {
    client: Client,
    embed_url: String,
    model: String,
    dimension: usize,
}

impl PineconeInference {
    /// Create an inference client from the given configuration
    pub fn new(config: &PineconeConfig) -> Result<Self> {
        Ok(Self {
            client: api_client(&config.api_key)?,
            embed_url: format!("{}/embed", config.controller_url),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    parameters: EmbedParameters<'a>,
    inputs: Vec<EmbedInput<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedParameters<'a> {
    input_type: &'a str,
    truncate: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedVector>,
}

#[derive(Debug, Deserialize)]
struct EmbedVector {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for PineconeInference {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>> {
        debug!(
            "Embedding {} chars with {} as {}",
            text.len(),
            self.model,
            mode.input_type()
        );

        let request = EmbedRequest {
            model: &self.model,
            parameters: EmbedParameters {
                input_type: mode.input_type(),
                truncate: TRUNCATE,
            },
            inputs: vec![EmbedInput { text }],
        };

        let response = self
            .client
            .post(&self.embed_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MapMemError::backend(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MapMemError::backend(format!(
                "Embedding request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| MapMemError::backend(format!("Invalid embedding response: {}", e)))?;

        let values = parsed
            .data
            .into_iter()
            .next()
            .map(|v| v.values)
            .ok_or_else(|| MapMemError::backend("Embedding response contained no vectors"))?;

        if values.len() != self.dimension {
            return Err(MapMemError::dimension(
                format!("Model '{}' returned an unexpected dimension", self.model),
                values.len(),
                self.dimension,
            ));
        }

        Ok(values)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embed_request_wire_shape() {
        let request = EmbedRequest {
            model: "multilingual-e5-large",
            parameters: EmbedParameters {
                input_type: EmbeddingMode::Document.input_type(),
                truncate: TRUNCATE,
            },
            inputs: vec![EmbedInput {
                text: "Salesforce: Email (string)",
            }],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "multilingual-e5-large",
                "parameters": { "input_type": "passage", "truncate": "END" },
                "inputs": [{ "text": "Salesforce: Email (string)" }]
            })
        );
    }

    #[test]
    fn test_query_mode_uses_query_input_type() {
        let parameters = EmbedParameters {
            input_type: EmbeddingMode::Query.input_type(),
            truncate: TRUNCATE,
        };
        assert_eq!(
            serde_json::to_value(&parameters).unwrap(),
            json!({ "input_type": "query", "truncate": "END" })
        );
    }

    #[test]
    fn test_embed_response_parses() {
        let parsed: EmbedResponse = serde_json::from_value(json!({
            "model": "multilingual-e5-large",
            "data": [{ "values": [0.1, 0.2, 0.3] }],
            "usage": { "total_tokens": 7 }
        }))
        .unwrap();

        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].values, vec![0.1, 0.2, 0.3]);
    }
}
