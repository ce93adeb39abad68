//! Bounded line splitter for upstream byte chunks

/// Longest line kept in memory; anything longer is dropped
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Accumulates network chunks and hands out complete lines
///
/// Lines are decoded as UTF-8 only once complete, so multi-byte characters
/// split across chunks survive. A trailing `\r` is stripped.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    max_line_bytes: usize,
    /// Set while skipping the remainder of an over-long line
    discarding: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_limit(MAX_LINE_BYTES)
    }

    pub fn with_limit(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_bytes,
            discarding: false,
        }
    }

    /// Feed a chunk and return every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.buffer.len() + head.len() > self.max_line_bytes {
                self.drop_oversized();
                continue;
            }

            self.buffer.extend_from_slice(head);
            lines.push(self.take_line());
        }

        if !self.discarding {
            if self.buffer.len() + rest.len() > self.max_line_bytes {
                self.drop_oversized();
                self.discarding = true;
            } else {
                self.buffer.extend_from_slice(rest);
            }
        }

        lines
    }

    /// Flush an unterminated final line once the byte stream has ended
    pub fn finish(&mut self) -> Option<String> {
        if self.discarding || self.buffer.is_empty() {
            self.discarding = false;
            self.buffer.clear();
            return None;
        }
        Some(self.take_line())
    }

    fn take_line(&mut self) -> String {
        if self.buffer.last() == Some(&b'\r') {
            self.buffer.pop();
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        line
    }

    fn drop_oversized(&mut self) {
        tracing::warn!(
            limit = self.max_line_bytes,
            "Dropping over-long upstream line"
        );
        self.buffer.clear();
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
