//! Prompt templates and prompt construction.
//!
//! The first request of a session is built from the mode's template with
//! `{history}` and `{bot_name}` substituted. Every later request is the bare
//! transcript followed by the bot label, so the service simply continues it.
//!
//! Template syntax: `{history}`, `{bot_name}` (also accepted as `{botName}`),
//! and `{{` / `}}` for literal braces. Anything else inside braces is an
//! error.

use super::errors::TemplateError;
use super::state::EngineState;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    History,
    BotName,
}

/// A parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses template text, rejecting unknown placeholders and stray braces.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' => {
                    if chars.next_if(|&(_, next)| next == '{').is_some() {
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(TemplateError::malformed(
                                    position,
                                    "nested '{' inside placeholder",
                                ))
                            }
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::malformed(position, "unclosed placeholder"));
                    }

                    let segment = match name.as_str() {
                        "history" => Segment::History,
                        "bot_name" | "botName" => Segment::BotName,
                        "" => return Err(TemplateError::malformed(position, "empty placeholder")),
                        _ => return Err(TemplateError::unknown_placeholder(name, position)),
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' => {
                    if chars.next_if(|&(_, next)| next == '}').is_none() {
                        return Err(TemplateError::malformed(position, "single '}' in template"));
                    }
                    literal.push('}');
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Checks template text the way an editor would before saving it.
    pub fn validate(text: &str) -> Result<(), TemplateError> {
        if text.trim().is_empty() {
            return Err(TemplateError::Empty);
        }
        Self::parse(text).map(|_| ())
    }

    /// Substitutes both placeholders.
    pub fn render(&self, history: &str, bot_name: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::History => out.push_str(history),
                Segment::BotName => out.push_str(bot_name),
            }
        }
        out
    }
}

/// Builds the prompt for the next request of a session.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Returns the prompt for the current state.
    ///
    /// While the latch is open this renders the mode template and closes the
    /// latch. A template failure leaves the latch open. Afterwards it returns
    /// the continuation form `"{transcript}\n{bot_label}:"`.
    pub fn build(state: &mut EngineState) -> Result<String, TemplateError> {
        let history = state.transcript.render();
        let bot_label = state.transcript.labels().bot.clone();

        if state.initial_prompt_sent {
            return Ok(format!("{}\n{}:", history, bot_label));
        }

        let prompt = PromptTemplate::parse(&state.mode.prompt_template)?.render(&history, &bot_label);
        state.initial_prompt_sent = true;
        Ok(prompt)
    }
}
