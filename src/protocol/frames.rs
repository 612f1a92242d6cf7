// Frame decoding for the agent's SSE-style response stream
//
// Each turn answers with a sequence of text lines. Lines carrying payload are
// prefixed `data:`; the payload is one JSON object with a `type` discriminator
// routing it to a transcript delta, a surface operation, a turn-level error,
// or the terminal end-of-turn marker.
//
// The transport is treated as unreliable: a line that fails to parse is
// skipped and the stream continues. A single bad frame must never abort a
// turn, so nothing in here returns an error.

use super::SurfaceOp;
use serde::Deserialize;

/// One decoded frame from the response stream
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamFrame {
    /// Transcript delta: replaces the assistant text of the current turn
    Text { content: String },

    /// A surface operation ("a2ui" on the wire: agent-to-UI)
    #[serde(rename = "a2ui")]
    Ui { content: SurfaceOp },

    /// End of turn; the connection can be released
    #[serde(rename_all = "camelCase")]
    Complete {
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        surface_id: Option<String>,
    },

    /// The agent failed this turn; prior state stays intact
    Error { content: String },
}

/// Decode a single stream line into a frame.
///
/// Returns `None` for anything that is not a well-formed payload line:
/// blank lines, `event:` lines, `[DONE]` sentinels, JSON that does not parse,
/// or frame types this client does not know. The `data:` marker is optional
/// so batch replays (plain JSONL) decode the same way as live SSE.
pub fn decode_line(line: &str) -> Option<StreamFrame> {
    let line = line.trim();
    let payload = line.strip_prefix("data:").map(str::trim).unwrap_or(line);

    if payload.is_empty() || payload == "[DONE]" || !payload.starts_with('{') {
        return None;
    }

    serde_json::from_str(payload).ok()
}

/// Reassembles complete lines from arbitrary byte chunks.
///
/// HTTP chunking does not respect line boundaries, so a frame can arrive
/// split across reads. Bytes after the last newline are buffered until the
/// next chunk; `finish` drains whatever remains when the stream ends.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every complete line it closed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Invalid UTF-8 mid-chunk is replaced, not fatal: the affected frame
        // fails JSON parsing and is skipped like any other malformed frame.
        self.pending.push_str(&String::from_utf8_lossy(chunk));

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }

    /// Drain the trailing partial line, if any
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
