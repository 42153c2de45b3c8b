//! Conversation module - the per-session engine core.
//!
//! Holds the pieces that turn a transcript into prompts and a streamed
//! response back into a turn:
//! - `Transcript` - append-only log of turns
//! - `ModeConfig` - template, seed lines, end marker, generator
//! - `PromptBuilder` - first-turn template vs. continuation prompt
//! - `StreamingResponseAccumulator` - chunk decoding and end detection
//! - `EngineState` - transcript, mode and the initial-prompt latch

mod accumulator;
mod errors;
mod mode;
mod prompt;
mod state;
mod transcript;
mod turn;

pub use accumulator::{
    AccumulatedReply, AccumulatorState, StreamingResponseAccumulator, UNPARSEABLE_REPLY,
};
pub use errors::{ModeConfigError, TemplateError};
pub use mode::{parse_seed_lines, GeneratorKind, MessageGenerator, ModeConfig};
pub use prompt::{PromptBuilder, PromptTemplate};
pub use state::EngineState;
pub use transcript::Transcript;
pub use turn::{Speaker, SpeakerLabels, Turn};
