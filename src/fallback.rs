use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Mimics the latency of a real round trip so callers that assume
/// asynchronous completion behave the same on the fallback path.
const SIMULATED_LATENCY: Duration = Duration::from_millis(450);

const GENERIC_REPLIES: &[&str] = &[
    "I can't reach the assistant service right now, so I'm answering from \
     local mode. Try rephrasing your question once the connection is back, \
     or ask me about dashboards, charts, or datasets.",
    "The assistant service is unreachable at the moment. From here I can \
     still point you at the Dashboards and Charts sections of the app; \
     full answers will resume once the service reconnects.",
    "I couldn't open a connection to the assistant service, so this is a \
     locally generated reply. Your question was received; please try again \
     shortly.",
];

/// Locally synthesized replies, used only when the chat request could not
/// obtain a stream at all. Never invoked mid-stream.
pub struct FallbackResponder {
    delay: Duration,
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackResponder {
    pub fn new() -> Self {
        Self {
            delay: SIMULATED_LATENCY,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Deterministic for a given utterance.
    pub async fn respond(&self, utterance: &str) -> String {
        tokio::time::sleep(self.delay).await;
        canned_reply(utterance)
    }
}

pub fn canned_reply(utterance: &str) -> String {
    let normalized = utterance.to_lowercase();

    if normalized.contains("dashboard") {
        return "I can't query your dashboards while the assistant service is \
                offline. The Dashboards tab lists every board you can access, \
                and I'll be able to search and summarize them once the \
                connection is restored."
            .to_string();
    }
    if normalized.contains("chart") || normalized.contains("graph") || normalized.contains("viz") {
        return "Chart lookups need the assistant service, which I can't reach \
                right now. You can browse existing charts under the Charts \
                tab in the meantime."
            .to_string();
    }
    if normalized.contains("dataset") || normalized.contains("table") || normalized.contains("sql")
    {
        return "I can't inspect datasets without the assistant service. Once \
                it's reachable again I can list tables, describe columns, and \
                draft queries for you."
            .to_string();
    }
    if normalized.starts_with("hello") || normalized.starts_with("hi") || normalized.starts_with("hey")
    {
        return "Hello! I'm running in local mode because the assistant \
                service is unreachable, but I'm here. Ask me again in a \
                moment and I'll have full answers."
            .to_string();
    }

    GENERIC_REPLIES[utterance_fingerprint(utterance) % GENERIC_REPLIES.len()].to_string()
}

fn utterance_fingerprint(utterance: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    utterance.hash(&mut hasher);
    hasher.finish() as usize
}
