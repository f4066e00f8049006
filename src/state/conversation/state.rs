use crate::api::ChatClient;
use crate::fallback::FallbackResponder;
use crate::state::turn::{ConversationTurn, TurnOrigin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Incremental view updates pushed to the display sink. At most one update
/// is emitted per processed stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationStreamUpdate {
    /// Ephemeral status text replacing the open turn's display text.
    Status { index: usize, text: String },
    /// A content fragment appended to the open turn's answer.
    Delta { index: usize, text: String },
    /// The turn reached its final text.
    Resolved { index: usize, text: String },
    /// The turn terminated with a user-facing failure message.
    Failed { index: usize, message: String },
}

pub struct ConversationManager {
    pub(super) client: Arc<ChatClient>,
    pub(super) fallback: FallbackResponder,
    pub(super) turns: Vec<ConversationTurn>,
    pub(super) busy: Arc<AtomicBool>,
    pub(super) next_turn_id: u64,
    pub(super) next_request_id: u64,
}

impl ConversationManager {
    pub fn new(client: ChatClient) -> Self {
        Self::with_fallback(client, FallbackResponder::new())
    }

    pub fn with_fallback(client: ChatClient, fallback: FallbackResponder) -> Self {
        Self {
            client: Arc::new(client),
            fallback,
            turns: Vec::new(),
            busy: Arc::new(AtomicBool::new(false)),
            next_turn_id: 0,
            next_request_id: 0,
        }
    }

    /// Read-only view of the transcript, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> Arc<ChatClient> {
        Arc::clone(&self.client)
    }

    /// Append a turn and return its index, the handle used for all later
    /// in-place updates.
    pub(super) fn push_turn(&mut self, origin: TurnOrigin, text: impl Into<String>) -> usize {
        let id = self.next_turn_id;
        self.next_turn_id += 1;
        self.turns.push(ConversationTurn::new(id, origin, text));
        self.turns.len() - 1
    }

    pub(super) fn set_turn_text(&mut self, index: usize, text: &str) {
        if let Some(turn) = self.turns.get_mut(index) {
            turn.text = text.to_string();
        }
    }

    #[cfg(test)]
    pub(super) fn force_busy(&self) {
        self.busy.store(true, Ordering::SeqCst);
    }
}

/// Mutual-exclusion token for the single in-flight request. Clears the busy
/// flag when dropped, which covers every exit path including cancellation of
/// the send future.
pub(super) struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    pub(super) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(Arc::clone(flag)))
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
