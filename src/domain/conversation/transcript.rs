//! Ordered, append-only log of turns.

use super::turn::{Speaker, SpeakerLabels, Turn};

/// The conversation so far, in chronological order.
///
/// Turns are only ever appended; the whole transcript is replaced (never
/// edited) when the engine switches mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
    labels: SpeakerLabels,
}

impl Transcript {
    /// Creates an empty transcript rendered with the given labels.
    pub fn new(labels: SpeakerLabels) -> Self {
        Self {
            turns: Vec::new(),
            labels,
        }
    }

    /// Appends a turn.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(Turn::new(speaker, text));
    }

    /// Renders every turn as `"{label}: {text}"`, joined by newlines.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", self.labels.label(turn.speaker()), turn.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn labels(&self) -> &SpeakerLabels {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_transcript_renders_empty_string() {
        assert_eq!(Transcript::default().render(), "");
    }

    #[test]
    fn render_joins_turns_in_insertion_order() {
        let mut transcript = Transcript::default();
        transcript.append(Speaker::User, "hello");
        transcript.append(Speaker::Bot, "hi");
        transcript.append(Speaker::User, "how are you?");

        assert_eq!(transcript.render(), "User: hello\nBot: hi\nUser: how are you?");
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last(), Some(&Turn::user("how are you?")));
    }

    #[test]
    fn render_uses_configured_labels() {
        let mut transcript = Transcript::new(SpeakerLabels::new("You", "Assistant"));
        transcript.append(Speaker::User, "a");
        transcript.append(Speaker::Bot, "b");

        assert_eq!(transcript.render(), "You: a\nAssistant: b");
    }

    #[test]
    fn empty_text_still_produces_a_line() {
        let mut transcript = Transcript::default();
        transcript.append(Speaker::Bot, "");
        assert_eq!(transcript.render(), "Bot: ");
    }

    fn speaker_strategy() -> impl Strategy<Value = Speaker> {
        prop_oneof![Just(Speaker::User), Just(Speaker::Bot)]
    }

    proptest! {
        #[test]
        fn render_matches_appended_lines(
            turns in prop::collection::vec((speaker_strategy(), "[^\n]{0,20}"), 0..20)
        ) {
            let mut transcript = Transcript::default();
            for (speaker, text) in &turns {
                transcript.append(*speaker, text.clone());
            }

            let expected = turns
                .iter()
                .map(|(speaker, text)| format!("{}: {}", speaker, text))
                .collect::<Vec<_>>()
                .join("\n");

            prop_assert_eq!(transcript.render(), expected.clone());
            // Rendering has no side effects.
            prop_assert_eq!(transcript.render(), expected);
        }
    }
}
