//! Incremental decoder for the chat gateway's `data: <json>` line protocol.
//!
//! The decoder owns one text buffer. Bytes are appended as they arrive and
//! complete lines are peeled off the front. A `data:` line whose payload does
//! not parse is pushed back with its newline restored and extraction stops
//! until more bytes arrive, so a record is never dropped or applied twice.
//! Well-formed JSON of any other shape is consumed without a delta.
//!
//! A payload that is malformed rather than incomplete is indistinguishable
//! from a truncated one and holds the decoder at that line for good.

use crate::types::delta_content;

/// Prefix of payload lines
pub const DATA_PREFIX: &str = "data:";
/// Payload that ends the stream
pub const DONE_SENTINEL: &str = "[DONE]";

const REPLACEMENT: char = '\u{FFFD}';

/// Output of one [`SseDecoder::feed`] step
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Content deltas in arrival order
    pub deltas: Vec<String>,
    /// The terminator has been seen; later input is ignored
    pub done: bool,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across chunks
    pending: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Text received but not yet consumed as a complete record.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Append a chunk and extract every delta it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Feed {
        if self.done {
            return Feed {
                deltas: vec![],
                done: true,
            };
        }

        self.push_bytes(chunk);

        let mut deltas = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }

            if line.starts_with(':') || line.trim().is_empty() {
                continue;
            }
            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            let payload = payload.trim();

            if payload == DONE_SENTINEL {
                self.done = true;
                self.buffer.clear();
                break;
            }

            match serde_json::from_str::<serde_json::Value>(payload) {
                Ok(value) => {
                    if let Some(content) = delta_content(&value).filter(|c| !c.is_empty()) {
                        deltas.push(content.to_string());
                    }
                }
                Err(e) => {
                    tracing::debug!("Deferring unparsable frame until more data arrives: {}", e);
                    line.push('\n');
                    self.buffer.insert_str(0, &line);
                    break;
                }
            }
        }

        Feed {
            deltas,
            done: self.done,
        }
    }

    /// Decode as much of `pending + chunk` as forms valid UTF-8, keeping an
    /// incomplete trailing sequence for the next chunk.
    fn push_bytes(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(e) => (e.valid_up_to(), e.error_len()),
            };
            if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
                self.buffer.push_str(text);
            }
            match invalid_len {
                Some(len) => {
                    self.buffer.push(REPLACEMENT);
                    self.pending.drain(..valid + len);
                }
                None => {
                    self.pending.drain(..valid);
                    return;
                }
            }
        }
    }
}
