use crate::api::client::{ByteStream, MockStreamProducer};
use crate::types::ApiMessage;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

/// One scripted transport chunk. Chunks are delivered verbatim so tests
/// control exactly where frame boundaries fall.
#[derive(Clone)]
pub enum MockChunk {
    Data(String),
    TransportError(String),
}

impl MockChunk {
    pub fn data(chunk: impl Into<String>) -> Self {
        Self::Data(chunk.into())
    }

    /// A complete `data:`-framed event line for the given JSON payload.
    pub fn frame(event_json: &str) -> Self {
        Self::Data(format!("data: {event_json}\n\n"))
    }
}

/// Scripted stream producer. Each configured response is consumed by one
/// `create_stream` call; once the script runs out, dispatch itself fails,
/// which is how tests exercise the fallback path.
#[derive(Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<Vec<MockChunk>>>>,
    requests_seen: Arc<Mutex<Vec<Vec<ApiMessage>>>>,
}

impl MockChatClient {
    pub fn new(responses: Vec<Vec<MockChunk>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every message history passed to `create_stream`, in call order.
    pub fn requests_seen(&self) -> Vec<Vec<ApiMessage>> {
        self.requests_seen.lock().unwrap().clone()
    }
}

impl MockStreamProducer for MockChatClient {
    fn create_mock_stream(&self, messages: &[ApiMessage]) -> Result<ByteStream> {
        self.requests_seen.lock().unwrap().push(messages.to_vec());

        let mut responses_guard = self.responses.lock().unwrap();
        if responses_guard.is_empty() {
            return Err(anyhow!("MockChatClient: no more responses configured"));
        }
        let chunks = responses_guard.remove(0);

        let items: Vec<Result<Bytes>> = chunks
            .into_iter()
            .map(|chunk| match chunk {
                MockChunk::Data(data) => Ok(Bytes::from(data)),
                MockChunk::TransportError(detail) => Err(anyhow!("mock transport error: {detail}")),
            })
            .collect();

        Ok(Box::pin(stream::iter(items)))
    }
}
