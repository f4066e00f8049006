use super::history::{messages_for_api, resolve_history_limits};
use super::state::{BusyGuard, ConversationManager, ConversationStreamUpdate};
use super::streaming::{
    emit_update, render_stream_failure_message, EventOutcome, StreamSession, THINKING_MARKER,
};
use crate::api::client::ByteStream;
use crate::api::logging::{emit_dispatch_failure, emit_stream_failure};
use crate::api::stream::StreamParser;
use crate::state::turn::TurnOrigin;
use crate::util::non_empty_trimmed;
use anyhow::{anyhow, Result};
use futures::StreamExt;
use tokio::sync::mpsc;

/// How one consumed stream ended.
enum StreamResolution {
    Finished(String),
    /// The transport dropped before a single event frame was processed, so
    /// the dispatch-failure recovery policy still applies.
    NothingReceived(anyhow::Error),
}

impl ConversationManager {
    /// Submit one user utterance and drive the reply stream to completion.
    ///
    /// Returns `Ok(None)` without side effects when the input is empty after
    /// trimming or another submission is still in flight. Otherwise the user
    /// turn and an open assistant turn are appended, the open turn is mutated
    /// in place as frames arrive (mirrored to `sink`), and the final answer
    /// text is returned. A stream that fails after it started producing
    /// events resolves the turn with a failure message and returns an error;
    /// a request that never produced a stream is answered by the fallback
    /// responder instead.
    pub async fn send_message(
        &mut self,
        input: &str,
        sink: Option<&mpsc::UnboundedSender<ConversationStreamUpdate>>,
    ) -> Result<Option<String>> {
        let Some(utterance) = non_empty_trimmed(input) else {
            return Ok(None);
        };
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            return Ok(None);
        };
        let utterance = utterance.to_string();

        self.push_turn(TurnOrigin::User, utterance.clone());
        let limits = resolve_history_limits();
        let history = messages_for_api(&self.turns, &limits);

        // The placeholder gives the display an anchor before the network
        // call begins; its index is the handle for every later update.
        let open_index = self.push_turn(TurnOrigin::Assistant, THINKING_MARKER);
        emit_update(
            sink,
            ConversationStreamUpdate::Status {
                index: open_index,
                text: THINKING_MARKER.to_string(),
            },
        );

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let resolution = match self.client().create_stream(&history).await {
            Ok(stream) => self.consume_stream(request_id, open_index, stream, sink).await?,
            Err(error) => StreamResolution::NothingReceived(error),
        };

        match resolution {
            StreamResolution::Finished(text) => Ok(Some(text)),
            StreamResolution::NothingReceived(error) => {
                emit_dispatch_failure(&error);
                let reply = self.fallback.respond(&utterance).await;
                self.set_turn_text(open_index, &reply);
                emit_update(
                    sink,
                    ConversationStreamUpdate::Resolved {
                        index: open_index,
                        text: reply.clone(),
                    },
                );
                Ok(Some(reply))
            }
        }
    }

    /// Decode frames out of the byte stream and fold each event into the
    /// open turn. Returns `Err` only for a terminal stream failure, after
    /// the open turn has been finalized with a user-facing message.
    async fn consume_stream(
        &mut self,
        request_id: u64,
        open_index: usize,
        mut stream: ByteStream,
        sink: Option<&mpsc::UnboundedSender<ConversationStreamUpdate>>,
    ) -> Result<StreamResolution> {
        let mut parser = StreamParser::new();
        let mut session = StreamSession::new(request_id);
        let mut received_first_frame = false;

        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(error) if !received_first_frame => {
                    return Ok(StreamResolution::NothingReceived(error));
                }
                Err(error) => {
                    // The user is already mid-answer; surface the failure on
                    // the open turn instead of falling back.
                    let detail = match &session.last_status {
                        Some(status) => format!("{error:#} (last status: {status})"),
                        None => format!("{error:#}"),
                    };
                    emit_stream_failure(session.request_id, &detail);
                    let message = render_stream_failure_message("the connection was interrupted");
                    return self.fail_turn(open_index, message, sink);
                }
            };

            for event in parser.process(&chunk)? {
                received_first_frame = true;
                match session.apply(event) {
                    EventOutcome::Status(text) => {
                        self.set_turn_text(open_index, &text);
                        emit_update(
                            sink,
                            ConversationStreamUpdate::Status {
                                index: open_index,
                                text,
                            },
                        );
                    }
                    EventOutcome::Appended(fragment) => {
                        self.set_turn_text(open_index, &session.accumulated_text);
                        emit_update(
                            sink,
                            ConversationStreamUpdate::Delta {
                                index: open_index,
                                text: fragment,
                            },
                        );
                    }
                    EventOutcome::Finished(text) => {
                        return self.finish_turn(open_index, text, sink);
                    }
                    EventOutcome::Failed(message) => {
                        emit_stream_failure(session.request_id, &message);
                        return self.fail_turn(open_index, message, sink);
                    }
                    EventOutcome::Ignored => {}
                }
            }
        }

        // Transport closed without a terminal frame.
        if !received_first_frame {
            return Ok(StreamResolution::NothingReceived(anyhow!(
                "stream ended before any event frame arrived"
            )));
        }
        let leftover = parser.flush();
        if !leftover.trim().is_empty() {
            emit_stream_failure(
                session.request_id,
                &format!("stream closed with an unterminated frame: {leftover:?}"),
            );
        }
        let text = session.resolve_at_end_of_stream();
        self.finish_turn(open_index, text, sink)
    }

    fn finish_turn(
        &mut self,
        open_index: usize,
        text: String,
        sink: Option<&mpsc::UnboundedSender<ConversationStreamUpdate>>,
    ) -> Result<StreamResolution> {
        self.set_turn_text(open_index, &text);
        emit_update(
            sink,
            ConversationStreamUpdate::Resolved {
                index: open_index,
                text: text.clone(),
            },
        );
        Ok(StreamResolution::Finished(text))
    }

    fn fail_turn(
        &mut self,
        open_index: usize,
        message: String,
        sink: Option<&mpsc::UnboundedSender<ConversationStreamUpdate>>,
    ) -> Result<StreamResolution> {
        self.set_turn_text(open_index, &message);
        emit_update(
            sink,
            ConversationStreamUpdate::Failed {
                index: open_index,
                message: message.clone(),
            },
        );
        Err(anyhow!(message))
    }
}
