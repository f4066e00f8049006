use super::state::ConversationStreamUpdate;
use crate::types::StreamEvent;
use tokio::sync::mpsc;

pub(super) const THINKING_MARKER: &str = "Thinking…";
pub(super) const PROCESSING_MARKER: &str = "Processing…";
pub(super) const NO_CONTENT_MARKER: &str =
    "The assistant finished without returning any content.";

pub(super) fn render_tool_running_marker(tool_name: &str) -> String {
    format!("Running {tool_name}…")
}

pub(super) fn render_tool_completed_marker(tool_name: &str) -> String {
    format!("{tool_name} completed")
}

pub(super) fn render_stream_failure_message(detail: &str) -> String {
    format!("Sorry, the assistant ran into a problem: {detail}")
}

/// Per-request streaming state, owned by the reconciler for exactly one
/// request. `accumulated_text` grows append-only from `content` frames;
/// status frames never touch it, so the resolved value is exactly the
/// concatenation of the content fragments.
pub(super) struct StreamSession {
    pub(super) request_id: u64,
    pub(super) accumulated_text: String,
    pub(super) last_status: Option<String>,
    pub(super) resolved: bool,
}

/// What one applied event means for the open turn.
pub(super) enum EventOutcome {
    /// Ephemeral status text replaced the turn's display text.
    Status(String),
    /// A content fragment was appended; carries the fragment.
    Appended(String),
    /// Terminal success; carries the final turn text.
    Finished(String),
    /// Terminal failure; carries the user-facing message.
    Failed(String),
    /// Nothing actionable: unknown event type, or a frame after resolution.
    Ignored,
}

impl StreamSession {
    pub(super) fn new(request_id: u64) -> Self {
        Self {
            request_id,
            accumulated_text: String::new(),
            last_status: None,
            resolved: false,
        }
    }

    pub(super) fn apply(&mut self, event: StreamEvent) -> EventOutcome {
        if self.resolved {
            return EventOutcome::Ignored;
        }

        match event {
            StreamEvent::ToolStart { tool_name } => {
                self.status(render_tool_running_marker(&tool_name))
            }
            StreamEvent::Progress { content } => {
                let text = content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| PROCESSING_MARKER.to_string());
                self.status(text)
            }
            StreamEvent::ToolResult { tool_name } => {
                self.status(render_tool_completed_marker(&tool_name))
            }
            StreamEvent::Content { content } => {
                self.accumulated_text.push_str(&content);
                EventOutcome::Appended(content)
            }
            StreamEvent::Error { error } => {
                self.resolved = true;
                EventOutcome::Failed(render_stream_failure_message(&error))
            }
            StreamEvent::Done => {
                self.resolved = true;
                EventOutcome::Finished(self.final_text())
            }
            StreamEvent::Unknown => EventOutcome::Ignored,
        }
    }

    /// Resolve as if a `done` frame had arrived. Used when the transport
    /// closes cleanly without a terminal frame.
    pub(super) fn resolve_at_end_of_stream(&mut self) -> String {
        self.resolved = true;
        self.final_text()
    }

    fn final_text(&self) -> String {
        if self.accumulated_text.is_empty() {
            NO_CONTENT_MARKER.to_string()
        } else {
            self.accumulated_text.clone()
        }
    }

    fn status(&mut self, text: String) -> EventOutcome {
        self.last_status = Some(text.clone());
        EventOutcome::Status(text)
    }
}

pub(super) fn emit_update(
    sink: Option<&mpsc::UnboundedSender<ConversationStreamUpdate>>,
    update: ConversationStreamUpdate,
) {
    if let Some(tx) = sink {
        let _ = tx.send(update);
    }
}
