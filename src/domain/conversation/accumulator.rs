//! Streaming response accumulation.
//!
//! The generation service answers with a sequence of raw chunks, each of
//! which is expected to be one JSON object `{"response": "...", ...}`. The
//! accumulator decodes every chunk on its own, appends the `response`
//! fragment to a buffer, and stops as soon as a fragment contains the mode's
//! end marker.
//!
//! Chunks that do not decode are dropped. The transport occasionally splits
//! one object across two chunks; those pieces are never stitched back
//! together.
//!
//! ```text
//! Open ──chunk──▶ Accumulating ──marker──▶ Completed
//!   │                  │ ──end of stream──▶ Exhausted
//!   │                  └──transport error──▶ Failed
//!   ├──end of stream──▶ Exhausted
//!   └──transport error──▶ Failed
//! ```

use futures::StreamExt;
use serde_json::Value;

use crate::domain::foundation::StateMachine;
use crate::ports::{ChunkStream, TransportError};

/// Reply text used when the stream ended without producing any text.
pub const UNPARSEABLE_REPLY: &str = "The service returned a reply in an unexpected format.";

/// Lifecycle of one streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccumulatorState {
    /// No chunk received yet.
    Open,
    /// At least one chunk received, no end marker seen.
    Accumulating,
    /// A fragment contained the end marker.
    Completed,
    /// The stream ended without the end marker.
    Exhausted,
    /// The transport failed.
    Failed,
}

impl StateMachine for AccumulatorState {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AccumulatorState::*;
        match self {
            Open => vec![Accumulating, Exhausted, Failed],
            Accumulating => vec![Accumulating, Completed, Exhausted, Failed],
            Completed | Exhausted | Failed => vec![],
        }
    }
}

/// Outcome of a response that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatedReply {
    pub text: String,
    /// True only when the end marker was seen.
    pub complete: bool,
}

/// Accumulates the fragments of one streamed response.
#[derive(Debug)]
pub struct StreamingResponseAccumulator {
    end_marker: String,
    buffer: String,
    state: AccumulatorState,
    decoded_chunks: usize,
    skipped_chunks: usize,
}

impl StreamingResponseAccumulator {
    pub fn new(end_marker: impl Into<String>) -> Self {
        Self {
            end_marker: end_marker.into(),
            buffer: String::new(),
            state: AccumulatorState::Open,
            decoded_chunks: 0,
            skipped_chunks: 0,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Text accumulated so far, untrimmed.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn skipped_chunks(&self) -> usize {
        self.skipped_chunks
    }

    /// Processes one raw chunk and returns the resulting state.
    ///
    /// Chunks arriving after a terminal state are ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> AccumulatorState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.advance(AccumulatorState::Accumulating);

        let Some(fragment) = decode_fragment(chunk) else {
            self.skipped_chunks += 1;
            tracing::debug!(bytes = chunk.len(), "Skipping chunk that is not a JSON object");
            return self.state;
        };

        self.decoded_chunks += 1;
        self.buffer.push_str(&fragment);

        // Only the fragment that just arrived is checked, not the buffer.
        if !fragment.is_empty() && fragment.contains(&self.end_marker) {
            self.advance(AccumulatorState::Completed);
        }
        self.state
    }

    /// Marks the transport as failed and drops the partial buffer.
    pub fn fail(&mut self) {
        self.advance(AccumulatorState::Failed);
        self.buffer.clear();
    }

    /// Produces the reply once no more chunks will be fed.
    ///
    /// Returns `None` if the accumulator has failed.
    pub fn finish(mut self) -> Option<AccumulatedReply> {
        match self.state {
            AccumulatorState::Completed => Some(AccumulatedReply {
                text: self.buffer.trim().to_string(),
                complete: true,
            }),
            AccumulatorState::Failed => None,
            AccumulatorState::Open
            | AccumulatorState::Accumulating
            | AccumulatorState::Exhausted => {
                self.advance(AccumulatorState::Exhausted);
                let trimmed = self.buffer.trim();
                let text = if trimmed.is_empty() {
                    UNPARSEABLE_REPLY.to_string()
                } else {
                    trimmed.to_string()
                };
                Some(AccumulatedReply {
                    text,
                    complete: false,
                })
            }
        }
    }

    /// Drives a chunk stream to completion or exhaustion.
    ///
    /// Chunks are processed strictly in arrival order. Reading stops at the
    /// first fragment containing the end marker, which drops (and so closes)
    /// the stream. A transport error discards everything received so far.
    pub async fn accumulate(
        mut self,
        mut stream: ChunkStream,
    ) -> Result<AccumulatedReply, TransportError> {
        while let Some(next) = stream.next().await {
            match next {
                Ok(chunk) => {
                    if self.feed(&chunk) == AccumulatorState::Completed {
                        break;
                    }
                }
                Err(err) => {
                    self.fail();
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            state = ?self.state,
            decoded = self.decoded_chunks,
            skipped = self.skipped_chunks,
            "Stream finished"
        );

        self.finish()
            .ok_or_else(|| TransportError::stream("accumulator already failed"))
    }

    fn advance(&mut self, next: AccumulatorState) {
        if self.state == next {
            return;
        }
        match self.state.transition_to(next) {
            Ok(state) => self.state = state,
            Err(err) => tracing::error!(error = %err, "Ignoring invalid accumulator transition"),
        }
    }
}

/// Decodes one chunk as a standalone JSON object and extracts `response`.
///
/// Returns `None` when the chunk is not a complete JSON object. A missing or
/// non-string `response` field yields an empty fragment.
fn decode_fragment(chunk: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(chunk).ok()?;
    let object = value.as_object()?;
    Some(
        object
            .get("response")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    )
}
