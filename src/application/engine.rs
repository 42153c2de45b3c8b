//! Conversation engine.
//!
//! Drives one conversation: records turns, builds the prompt, streams the
//! generation request through the accumulator and records the reply.
//!
//! The engine takes `&mut self` for every mutating call, so one instance can
//! never run two exchanges at once. Callers that share an engine wrap it in
//! a lock (see `ChatSession`).

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::errors::EngineError;
use crate::domain::conversation::{
    AccumulatedReply, EngineState, ModeConfig, PromptBuilder, Speaker, SpeakerLabels,
    StreamingResponseAccumulator, Transcript,
};
use crate::ports::{GenerationRequest, GenerationService, TransportError};

/// Per-engine settings that survive mode switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub labels: SpeakerLabels,
    /// Bound on one whole exchange, from sending the request to the last chunk.
    pub request_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            labels: SpeakerLabels::default(),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// The bot's answer to one `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// The stream ended without the end marker.
    pub degraded: bool,
}

impl From<AccumulatedReply> for Reply {
    fn from(reply: AccumulatedReply) -> Self {
        Self {
            text: reply.text,
            degraded: !reply.complete,
        }
    }
}

/// One conversation against a generation service.
pub struct ConversationEngine<S>
where
    S: GenerationService + ?Sized,
{
    service: Arc<S>,
    state: EngineState,
    options: EngineOptions,
}

impl<S> ConversationEngine<S>
where
    S: GenerationService + ?Sized,
{
    pub fn new(service: Arc<S>, mode: ModeConfig, options: EngineOptions) -> Self {
        let state = EngineState::new(mode, options.labels.clone());
        Self {
            service,
            state,
            options,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        self.state.transcript()
    }

    pub fn mode(&self) -> &ModeConfig {
        self.state.mode()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Sends the user's text and records the bot's reply.
    ///
    /// Empty text appends no User turn, which lets the bot continue on its
    /// own. The User turn is kept even if the request fails; a failed
    /// request appends no Bot turn and leaves the initial-prompt latch as it
    /// was before the call.
    pub async fn submit(&mut self, user_text: &str) -> Result<Reply, EngineError> {
        if !user_text.is_empty() {
            self.state.transcript.append(Speaker::User, user_text);
        }

        let latch_before = self.state.initial_prompt_sent;
        let prompt = PromptBuilder::build(&mut self.state)?;
        let templated = !latch_before;

        tracing::debug!(
            mode = %self.state.mode.id(),
            prompt_chars = prompt.chars().count(),
            templated,
            "Submitting prompt"
        );

        match self.exchange(prompt).await {
            Ok(accumulated) => {
                let reply = Reply::from(accumulated);
                self.state.transcript.append(Speaker::Bot, reply.text.clone());
                if reply.degraded {
                    tracing::warn!(
                        mode = %self.state.mode.id(),
                        degraded = true,
                        "Reply ended without end marker"
                    );
                } else {
                    tracing::info!(
                        mode = %self.state.mode.id(),
                        turns = self.state.transcript.len(),
                        "Reply received"
                    );
                }
                Ok(reply)
            }
            Err(err) => {
                self.state.initial_prompt_sent = latch_before;
                tracing::warn!(
                    mode = %self.state.mode.id(),
                    error = %err,
                    retryable = err.is_retryable(),
                    "Generation request failed"
                );
                Err(err.into())
            }
        }
    }

    /// Picks a seed line and turns it into the next user message.
    pub fn generate_next(&self) -> Result<String, EngineError> {
        self.generate_next_with(&mut rand::thread_rng())
    }

    /// Same as `generate_next` with a caller-supplied random source.
    pub fn generate_next_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, EngineError> {
        let mode = &self.state.mode;
        let seed = mode
            .choose_seed_line(rng)
            .ok_or_else(|| EngineError::EmptySeedSet(mode.id().to_string()))?;

        Ok(match mode.message_generator() {
            Some(generator) => generator.generate(seed),
            None => seed.to_string(),
        })
    }

    /// Starts over in a new mode: empty transcript, latch reset.
    pub fn switch_mode(&mut self, mode: ModeConfig) {
        tracing::info!(
            from = %self.state.mode.id(),
            to = %mode.id(),
            "Switching mode"
        );
        self.state = EngineState::new(mode, self.options.labels.clone());
    }

    async fn exchange(&self, prompt: String) -> Result<AccumulatedReply, TransportError> {
        let timeout = self.options.request_timeout;
        let accumulator = StreamingResponseAccumulator::new(self.state.mode.end_marker());

        let work = async {
            let stream = self
                .service
                .stream_generate(GenerationRequest::new(prompt))
                .await?;
            accumulator.accumulate(stream).await
        };

        tokio::time::timeout(timeout, work)
            .await
            .map_err(|_| TransportError::timeout(timeout.as_secs()))?
    }
}
