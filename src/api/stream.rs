use super::logging::emit_frame_decode_error;
use crate::types::StreamEvent;
use anyhow::Result;

/// Only lines carrying this sentinel are live frames; everything else on the
/// wire (blank keep-alive lines, comment lines) is skipped.
const FRAME_SENTINEL: &str = "data:";

/// Incremental frame decoder for the bridge's event stream.
///
/// Transport chunks have no alignment with frame boundaries, so the parser
/// keeps a carry-over buffer: a line is only decoded once its terminator has
/// been observed, and a trailing partial line is held for the next chunk.
#[derive(Default)]
pub struct StreamParser {
    buffer: String,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and decode every frame completed by it.
    /// A malformed frame is dropped with a diagnostic; it never aborts the
    /// stream.
    pub fn process(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut events = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[start..].find('\n') {
            let line_end = start + offset;
            let line = self.buffer[start..line_end].trim_end_matches('\r').trim();

            if let Some(payload) = line.strip_prefix(FRAME_SENTINEL) {
                let payload = payload.trim();
                if !payload.is_empty() {
                    match serde_json::from_str::<StreamEvent>(payload) {
                        Ok(event) => events.push(event),
                        Err(error) => emit_frame_decode_error(payload, &error),
                    }
                }
            }

            start = line_end + 1;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        Ok(events)
    }

    /// Take whatever trailing data never saw a line terminator.
    pub fn flush(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
