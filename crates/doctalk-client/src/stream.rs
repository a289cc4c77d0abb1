//! Framing for the streamed answer endpoint.
//!
//! The response body is a chunked byte stream carrying newline-delimited
//! event frames. Chunk boundaries are arbitrary; a frame may arrive split
//! across any number of reads, so [`LineDecoder`] carries the unterminated
//! tail from one chunk into the next. Complete frames are classified by
//! [`classify`] into data, terminal, or malformed events.

use shared::response::ChunkPayload;

pub const DATA_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Reassembles newline-delimited frames from arbitrary byte chunks.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and take back every line it completed, in order.
    /// Bytes after the last newline are held until the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(idx) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=idx).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// End of stream. The server newline-terminates every frame it finishes
    /// writing, so anything still pending is a truncated fragment; hand it
    /// back for logging and drop it.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// A complete frame, classified.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Data(ChunkPayload),
    Terminal,
    Malformed(String),
}

/// Classify one complete frame. Lines without the data prefix (blank
/// keep-alives, comments) produce nothing.
pub fn classify(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Terminal);
    }

    match serde_json::from_str::<ChunkPayload>(payload) {
        Ok(parsed) => Some(StreamEvent::Data(parsed)),
        Err(_) => Some(StreamEvent::Malformed(payload.to_string())),
    }
}
