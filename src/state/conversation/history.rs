use crate::state::turn::{ConversationTurn, TurnOrigin};
use crate::types::{ApiMessage, Role};

const MAX_HISTORY_MESSAGES_ENV: &str = "DASHCHAT_MAX_HISTORY_MESSAGES";
const MAX_MESSAGE_CHARS_ENV: &str = "DASHCHAT_MAX_MESSAGE_CHARS";

const DEFAULT_MAX_HISTORY_MESSAGES: usize = 40;
const DEFAULT_MAX_MESSAGE_CHARS: usize = 8_000;

pub(super) struct HistoryLimits {
    pub(super) max_messages: usize,
    pub(super) max_message_chars: usize,
}

pub(super) fn resolve_history_limits() -> HistoryLimits {
    HistoryLimits {
        max_messages: env_limit(MAX_HISTORY_MESSAGES_ENV, DEFAULT_MAX_HISTORY_MESSAGES, 4, 400),
        max_message_chars: env_limit(
            MAX_MESSAGE_CHARS_ENV,
            DEFAULT_MAX_MESSAGE_CHARS,
            512,
            100_000,
        ),
    }
}

fn env_limit(name: &str, default: usize, min: usize, max: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .map(|v| v.clamp(min, max))
        .unwrap_or(default)
}

/// Shape the outbound payload from the transcript. The newest turns win when
/// the message cap is hit, and oversized messages are truncated so a long
/// conversation cannot grow the request without bound. The caller passes the
/// slice up to (and excluding) the open placeholder.
pub(super) fn messages_for_api(
    turns: &[ConversationTurn],
    limits: &HistoryLimits,
) -> Vec<ApiMessage> {
    let start = turns.len().saturating_sub(limits.max_messages);
    turns[start..]
        .iter()
        .map(|turn| ApiMessage {
            role: match turn.origin {
                TurnOrigin::User => Role::User,
                TurnOrigin::Assistant => Role::Assistant,
            },
            content: truncate_for_history(&turn.text, limits.max_message_chars),
        })
        .collect()
}

pub(super) fn truncate_for_history(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}\n… (truncated)")
}
