use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role/content pair in the outbound chat payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: Role,
    pub content: String,
}

/// A decoded protocol frame from the assistant bridge. Frames carry extra
/// fields (timestamps, metadata) that deserialization ignores.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    ToolStart {
        tool_name: String,
    },
    Progress {
        #[serde(default)]
        content: Option<String>,
    },
    ToolResult {
        tool_name: String,
    },
    Content {
        content: String,
    },
    Error {
        error: String,
    },
    Done,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supports_functions: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_serializes_lowercase_roles() {
        let msg = ApiMessage {
            role: Role::Assistant,
            content: "Hi".into(),
        };
        let serialized = serde_json::to_value(&msg).unwrap();
        assert_eq!(serialized["role"], "assistant");
        assert_eq!(serialized["content"], "Hi");
    }

    #[test]
    fn test_stream_event_ignores_extra_frame_fields() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"tool_start","tool_name":"list_dashboards","content":"running","timestamp":"2025-01-01T00:00:00"}"#,
        )
        .unwrap();
        match event {
            StreamEvent::ToolStart { tool_name } => assert_eq!(tool_name, "list_dashboards"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_event_type_maps_to_unknown() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"usage","tokens":42}"#).unwrap();
        assert!(matches!(event, StreamEvent::Unknown));
    }
}
