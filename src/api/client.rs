use super::logging::{debug_payload_enabled, emit_debug_payload};
use crate::config::Config;
use crate::types::{ApiMessage, HealthStatus, ModelsResponse};
use crate::util::is_local_endpoint_url;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, messages: &[ApiMessage]) -> Result<ByteStream>;
}

/// HTTP client for the assistant bridge. One `create_stream` call maps to one
/// chat request with a streamed event body.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl ChatClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            #[cfg(test)]
            mock_stream_producer: None,
        }
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: "http://localhost:8000/chat".to_string(),
            model: "mock-model".to_string(),
            temperature: 0.0,
            max_tokens: 256,
            mock_stream_producer: Some(mock_producer),
        }
    }

    /// Dispatch the chat request. A non-success status or a connection error
    /// here means no event was ever produced; the caller decides the
    /// recovery policy.
    pub async fn create_stream(&self, messages: &[ApiMessage]) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_stream(messages);
            }
        }

        let payload = json!({
            "messages": messages,
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        if debug_payload_enabled() {
            emit_debug_payload(&self.api_url, &payload);
        }

        let response = self
            .http
            .post(&self.api_url)
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .json(&payload)
            .send()
            .await
            .map_err(|error| map_request_error(error, &self.api_url))?
            .error_for_status()
            .map_err(|error| map_request_error(error, &self.api_url))?;

        let request_url = self.api_url.clone();
        let stream = response
            .bytes_stream()
            .map(move |item| item.map_err(|error| map_request_error(error, &request_url)));
        Ok(Box::pin(stream))
    }

    pub async fn list_models(&self) -> Result<ModelsResponse> {
        let url = sibling_endpoint_url(&self.api_url, "models");
        let response: ModelsResponse = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| map_request_error(error, &url))?
            .error_for_status()
            .map_err(|error| map_request_error(error, &url))?
            .json()
            .await
            .map_err(|error| map_request_error(error, &url))?;
        Ok(response)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = sibling_endpoint_url(&self.api_url, "health");
        let status: HealthStatus = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| map_request_error(error, &url))?
            .error_for_status()
            .map_err(|error| map_request_error(error, &url))?
            .json()
            .await
            .map_err(|error| map_request_error(error, &url))?;
        Ok(status)
    }
}

fn map_request_error(error: reqwest::Error, request_url: &str) -> anyhow::Error {
    if error.is_connect() && is_local_endpoint_url(request_url) {
        return anyhow!(
            "cannot reach local assistant bridge '{}': {}. Start the bridge or update DASHCHAT_API_URL.",
            request_url,
            error
        );
    }
    if error.is_connect() {
        return anyhow!("cannot reach assistant bridge '{}': {}", request_url, error);
    }
    if error.is_timeout() {
        return anyhow!("request to '{}' timed out: {}", request_url, error);
    }
    if let Some(status) = error.status() {
        return anyhow!(
            "assistant bridge '{}' returned HTTP {}: {}",
            request_url,
            status,
            error
        );
    }
    anyhow!("request to '{}' failed: {}", request_url, error)
}

/// The bridge serves `/models` and `/health` next to the chat endpoint;
/// derive their URLs from the configured chat URL.
fn sibling_endpoint_url(api_url: &str, endpoint: &str) -> String {
    let normalized = api_url.trim_end_matches('/');
    match normalized.strip_suffix("/chat") {
        Some(base) => format!("{base}/{endpoint}"),
        None => format!("{normalized}/{endpoint}"),
    }
}
