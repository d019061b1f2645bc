//! Incremental SSE frame decoder.
//!
//! Turns an ordered sequence of byte chunks into complete `event`/`data`
//! frames. Chunks may split lines, frames, or even multi-byte UTF-8
//! characters at arbitrary positions; the decoder carries partial state
//! across `feed` calls so the resulting frame sequence is independent of
//! how the stream was chunked.

/// One complete SSE frame: an event name plus the joined `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Stateful decoder for one stream. Create per request, `feed` each chunk
/// in arrival order, then call `finish` once at end-of-stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Incomplete UTF-8 byte sequence held over from the previous chunk.
    carry: Vec<u8>,
    /// Undecoded text after the last complete line.
    buffer: String,
    current_event: String,
    current_data: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of raw bytes, returning every frame completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let text = self.decode_chunk(chunk);
        self.buffer.push_str(&text);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            self.handle_line(line.trim(), &mut frames);
        }
        frames
    }

    /// Flush at end-of-stream: process the residual partial line, then emit
    /// the pending frame if it has both an event name and data.
    pub fn finish(mut self) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        let rest = std::mem::take(&mut self.buffer);
        let line = rest.trim();
        if !line.is_empty() {
            self.handle_line(line, &mut frames);
        }
        if !self.current_event.is_empty() && !self.current_data.is_empty() {
            frames.push(SseFrame { event: self.current_event, data: self.current_data });
        }
        frames
    }

    /// Decode bytes streaming-safely: a multi-byte character split across
    /// chunk boundaries is held back until its remaining bytes arrive.
    fn decode_chunk(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);
        match std::str::from_utf8(&bytes) {
            Ok(text) => text.to_owned(),
            // Truncated trailing sequence: keep it for the next chunk.
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                self.carry = bytes[valid..].to_vec();
                String::from_utf8_lossy(&bytes[..valid]).into_owned()
            }
            // Genuinely invalid bytes mid-chunk: substitute and move on.
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn handle_line(&mut self, line: &str, out: &mut Vec<SseFrame>) {
        if let Some(rest) = line.strip_prefix("event:") {
            // A new event name while a full frame is pending terminates it.
            if !self.current_event.is_empty() && !self.current_data.is_empty() {
                out.push(SseFrame {
                    event: self.current_event.clone(),
                    data: std::mem::take(&mut self.current_data),
                });
            }
            self.current_event = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            let piece = rest.trim();
            if self.current_data.is_empty() {
                self.current_data = piece.to_string();
            } else {
                // SSE allows multiple data lines per frame, joined by newline.
                self.current_data.push('\n');
                self.current_data.push_str(piece);
            }
        } else if line.is_empty() {
            if !self.current_event.is_empty() && !self.current_data.is_empty() {
                out.push(SseFrame {
                    event: std::mem::take(&mut self.current_event),
                    data: std::mem::take(&mut self.current_data),
                });
            }
        }
        // Any other line shape (comments, id fields, garbage) is ignored.
    }
}

/// Decode a whole byte stream in one pass. Test/utility convenience over
/// `feed` + `finish`.
#[cfg(test)]
pub fn decode_all(chunks: impl IntoIterator<Item = impl AsRef<[u8]>>) -> Vec<SseFrame> {
    let mut decoder = FrameDecoder::new();
    let mut frames = Vec::new();
    for chunk in chunks {
        frames.extend(decoder.feed(chunk.as_ref()));
    }
    frames.extend(decoder.finish());
    frames
}
