//! Blocking client for a local Ollama-compatible generate endpoint.
//!
//! One request per call, no streaming, with a JSON-schema constraint so the
//! model can only answer with an object holding a single integer `seconds`
//! field. The HTTP connection is reused across calls through the persistent
//! [`reqwest::blocking::Client`].

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Default generate endpoint of a locally running Ollama server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// The seam between the row processor and the inference service.
///
/// Production code uses [`OllamaClient`]; tests substitute scripted fakes.
pub trait Generator {
    /// Issue one inference request and return the raw textual payload.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-success HTTP
    /// status, or a response body that does not match the endpoint contract.
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Schema constraint forcing `{"seconds": <integer>}` as the only valid output.
fn seconds_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "seconds": { "type": "integer" },
        },
        "required": ["seconds"],
    })
}

/// Synchronous HTTP client for the generate endpoint.
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for `endpoint`, querying `model` with a whole-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: seconds_schema(),
        }
    }
}

impl Generator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&self.request_body(prompt))
            .send()
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("inference endpoint returned {status}: {body}");
        }

        let body: GenerateResponse = response
            .json()
            .context("malformed response from inference endpoint")?;
        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_matches_wire_contract() {
        let client =
            OllamaClient::new(DEFAULT_ENDPOINT, "llama3", Duration::from_secs(5)).unwrap();
        let body = serde_json::to_value(client.request_body("estimate this")).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "llama3",
                "prompt": "estimate this",
                "stream": false,
                "format": {
                    "type": "object",
                    "properties": { "seconds": { "type": "integer" } },
                    "required": ["seconds"],
                },
            })
        );
    }

    #[test]
    fn test_seconds_schema_requires_integer_field() {
        let schema = seconds_schema();
        assert_eq!(schema["required"], json!(["seconds"]));
        assert_eq!(schema["properties"]["seconds"]["type"], json!("integer"));
    }

    #[test]
    fn test_generate_response_deserializes_payload() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"response": " {\"seconds\": 42} ", "done": true}"#).unwrap();
        assert_eq!(body.response.trim(), r#"{"seconds": 42}"#);
    }
}
