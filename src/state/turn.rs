use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOrigin {
    User,
    Assistant,
}

/// One message in the conversation transcript. An assistant turn is mutated
/// in place while its stream is open and becomes immutable once the stream
/// resolves or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: u64,
    pub origin: TurnOrigin,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(id: u64, origin: TurnOrigin, text: impl Into<String>) -> Self {
        Self {
            id,
            origin,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_origin_serializes_snake_case() {
        let turn = ConversationTurn::new(7, TurnOrigin::Assistant, "Hi");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["origin"], "assistant");
        assert_eq!(value["id"], 7);
        assert_eq!(value["text"], "Hi");
    }
}
