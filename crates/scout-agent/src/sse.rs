//! Incremental decoding of a server-sent-events body.
//!
//! Transport chunks do not line up with events: a `data:` line may arrive in
//! several pieces, and a multi-byte character may straddle two chunks. The
//! decoder keeps the unterminated tail between calls and only ever hands out
//! complete lines. Each `data:` line is one payload.
//!
//! A line that grows past the pending-byte limit without a terminator is
//! discarded up to its next newline and counted as dropped.

/// Default bound on bytes held for one unterminated line (1 MiB).
pub const MAX_PENDING_BYTES: usize = 1 << 20;

/// Byte-buffering SSE line decoder.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    max_pending: usize,
    discarding: bool,
    dropped: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_PENDING_BYTES)
    }
}

impl SseDecoder {
    /// Decoder with the default pending-byte limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that drops any line longer than `max_pending` bytes.
    pub fn with_limit(max_pending: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_pending,
            discarding: false,
            dropped: 0,
        }
    }

    /// Feeds one transport chunk; returns the payloads of every `data:` line
    /// completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut chunk = chunk;
        if self.discarding {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(end) => {
                    chunk = &chunk[end + 1..];
                    self.discarding = false;
                }
                None => return Vec::new(),
            }
        }
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(payload) = data_payload(&self.buffer[start..end]) {
                payloads.push(payload);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.max_pending {
            self.buffer.clear();
            self.discarding = true;
            self.dropped += 1;
        }
        payloads
    }

    /// Flushes a final line that was never newline-terminated.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        if std::mem::take(&mut self.discarding) {
            return Vec::new();
        }
        data_payload(&rest).into_iter().collect()
    }

    /// Lines dropped for exceeding the limit since the last call.
    pub fn take_dropped(&mut self) -> usize {
        std::mem::take(&mut self.dropped)
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    let data = line.strip_prefix("data:")?;
    Some(data.strip_prefix(' ').unwrap_or(data).to_string())
}

/// What one upstream payload means to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFrame {
    /// Non-empty assistant text.
    Delta(String),
    /// The provider's end-of-stream sentinel.
    Done,
    /// Valid JSON without text (role announcements, finish reasons, usage).
    Ignored,
    /// Not JSON; skipped.
    Malformed,
}

/// Interprets an OpenAI-style chat-completion chunk.
pub fn parse_frame(payload: &str) -> UpstreamFrame {
    let payload = payload.trim();
    if payload == "[DONE]" {
        return UpstreamFrame::Done;
    }

    let event: serde_json::Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(_) => return UpstreamFrame::Malformed,
    };

    match event["choices"][0]["delta"]["content"].as_str() {
        Some(text) if !text.is_empty() => UpstreamFrame::Delta(text.to_string()),
        _ => UpstreamFrame::Ignored,
    }
}
