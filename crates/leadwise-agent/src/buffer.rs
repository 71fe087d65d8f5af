// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Throttled delivery of streamed text to the display.

use std::time::Duration;

use tokio::time::Instant;

/// Default display cadence.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Accumulates chunks and releases them at most once per interval.
///
/// Callers `push` every chunk, call `take_if_due` on each tick, and
/// `flush` once the stream ends or is cancelled.
#[derive(Debug)]
pub struct StreamBuffer {
    pending: String,
    interval: Duration,
    last_flush: Option<Instant>,
}

impl StreamBuffer {
    pub fn new(interval: Duration) -> Self {
        Self {
            pending: String::new(),
            interval,
            last_flush: None,
        }
    }

    pub fn push(&mut self, chunk: &str) {
        self.pending.push_str(chunk);
    }

    /// Pending text, if any, when a full interval has passed since the last
    /// release. The first release is never delayed.
    pub fn take_if_due(&mut self, now: Instant) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let due = self
            .last_flush
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if !due {
            return None;
        }
        self.last_flush = Some(now);
        Some(std::mem::take(&mut self.pending))
    }

    /// Everything still pending, regardless of timing.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            self.last_flush = Some(Instant::now());
            Some(std::mem::take(&mut self.pending))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_chunks_per_interval() {
        let mut buffer = StreamBuffer::new(Duration::from_millis(50));
        let start = Instant::now();
        assert_eq!(buffer.take_if_due(start), None);

        buffer.push("Hel");
        assert_eq!(buffer.take_if_due(start).as_deref(), Some("Hel"));

        buffer.push("lo");
        buffer.push(", ");
        assert_eq!(buffer.take_if_due(start + Duration::from_millis(20)), None);
        assert_eq!(
            buffer.take_if_due(start + Duration::from_millis(50)).as_deref(),
            Some("lo, ")
        );
    }

    #[test]
    fn flush_releases_remainder() {
        let mut buffer = StreamBuffer::default();
        buffer.push("tail");
        assert!(!buffer.is_empty());
        assert_eq!(buffer.flush().as_deref(), Some("tail"));
        assert_eq!(buffer.flush(), None);
        assert!(buffer.is_empty());
    }
}
