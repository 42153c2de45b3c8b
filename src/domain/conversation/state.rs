//! Per-session engine state.

use super::mode::ModeConfig;
use super::transcript::Transcript;
use super::turn::SpeakerLabels;

/// Everything one conversation owns: its transcript, its mode and the
/// one-shot "initial prompt sent" latch.
///
/// There is no reset operation. A mode switch replaces the whole value.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub(crate) transcript: Transcript,
    pub(crate) mode: ModeConfig,
    pub(crate) initial_prompt_sent: bool,
}

impl EngineState {
    /// Creates a fresh state with an empty transcript and an open latch.
    pub fn new(mode: ModeConfig, labels: SpeakerLabels) -> Self {
        Self {
            transcript: Transcript::new(labels),
            mode,
            initial_prompt_sent: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn mode(&self) -> &ModeConfig {
        &self.mode
    }

    /// True once the templated first-turn prompt has been built.
    pub fn initial_prompt_sent(&self) -> bool {
        self.initial_prompt_sent
    }
}
