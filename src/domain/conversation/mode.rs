//! Per-mode configuration.
//!
//! A mode bundles everything that changes the engine's conversational
//! behavior: the first-turn prompt template, the seed lines used for
//! auto-generated turns, the end-of-response marker and an optional
//! strategy that turns a seed line into the next auto turn.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use super::errors::ModeConfigError;
use super::prompt::PromptTemplate;

/// Strategy that synthesizes the next auto turn from a seed line.
#[derive(Clone)]
pub struct MessageGenerator(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl MessageGenerator {
    /// Wraps an arbitrary transformation.
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Returns the seed line unchanged.
    pub fn identity() -> Self {
        Self::new(str::to_string)
    }

    /// Wraps the seed line in corner brackets.
    pub fn quoted() -> Self {
        Self::new(|seed| format!("「{}」", seed))
    }

    /// Builds the strategy named in configuration.
    pub fn from_kind(kind: GeneratorKind) -> Self {
        match kind {
            GeneratorKind::Identity => Self::identity(),
            GeneratorKind::Quoted => Self::quoted(),
        }
    }

    /// Applies the strategy to a seed line.
    pub fn generate(&self, seed: &str) -> String {
        (self.0)(seed)
    }
}

impl fmt::Debug for MessageGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageGenerator(..)")
    }
}

/// Generator strategies that can be named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Identity,
    Quoted,
}

/// Static configuration for one conversational mode.
///
/// Construct with [`ModeConfig::new`], which rejects templates that would
/// fail placeholder substitution and empty end markers. An empty seed set is
/// accepted; it only becomes an error when an auto turn is requested.
#[derive(Debug, Clone)]
pub struct ModeConfig {
    pub(crate) id: String,
    pub(crate) display_name: String,
    pub(crate) prompt_template: String,
    pub(crate) seed_lines: Vec<String>,
    pub(crate) end_marker: String,
    pub(crate) message_generator: Option<MessageGenerator>,
}

impl ModeConfig {
    /// Creates a validated mode configuration.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        prompt_template: impl Into<String>,
        seed_lines: Vec<String>,
        end_marker: impl Into<String>,
    ) -> Result<Self, ModeConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModeConfigError::EmptyId);
        }

        let end_marker = end_marker.into();
        if end_marker.is_empty() {
            return Err(ModeConfigError::EmptyEndMarker(id));
        }

        let prompt_template = prompt_template.into();
        if let Err(source) = PromptTemplate::validate(&prompt_template) {
            return Err(ModeConfigError::InvalidTemplate { mode: id, source });
        }

        Ok(Self {
            id,
            display_name: display_name.into(),
            prompt_template,
            seed_lines,
            end_marker,
            message_generator: None,
        })
    }

    /// Attaches a message generation strategy.
    pub fn with_message_generator(mut self, generator: MessageGenerator) -> Self {
        self.message_generator = Some(generator);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    pub fn seed_lines(&self) -> &[String] {
        &self.seed_lines
    }

    pub fn end_marker(&self) -> &str {
        &self.end_marker
    }

    pub fn message_generator(&self) -> Option<&MessageGenerator> {
        self.message_generator.as_ref()
    }

    /// Picks a seed line uniformly at random. `None` when the set is empty.
    pub fn choose_seed_line<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.seed_lines.choose(rng).map(String::as_str)
    }
}

/// Splits a seed file into seed lines: one per line, trimmed, blanks dropped.
pub fn parse_seed_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEMPLATE: &str = "Talk to {bot_name}.\n{history}\n{bot_name}:";

    fn mode(seeds: &[&str]) -> ModeConfig {
        ModeConfig::new(
            "normal",
            "Normal",
            TEMPLATE,
            seeds.iter().map(|s| s.to_string()).collect(),
            "」",
        )
        .unwrap()
    }

    #[test]
    fn new_accepts_valid_definition() {
        let mode = mode(&["hi"]);
        assert_eq!(mode.id(), "normal");
        assert_eq!(mode.display_name(), "Normal");
        assert_eq!(mode.end_marker(), "」");
        assert_eq!(mode.seed_lines(), ["hi".to_string()]);
        assert!(mode.message_generator().is_none());
    }

    #[test]
    fn new_accepts_empty_seed_set() {
        assert!(mode(&[]).seed_lines().is_empty());
    }

    #[test]
    fn new_rejects_empty_id() {
        let result = ModeConfig::new("  ", "Blank", TEMPLATE, vec![], "。");
        assert_eq!(result.unwrap_err(), ModeConfigError::EmptyId);
    }

    #[test]
    fn new_rejects_empty_end_marker() {
        let result = ModeConfig::new("normal", "Normal", TEMPLATE, vec![], "");
        assert!(matches!(result, Err(ModeConfigError::EmptyEndMarker(id)) if id == "normal"));
    }

    #[test]
    fn new_rejects_unknown_placeholder() {
        let result = ModeConfig::new("normal", "Normal", "{history} {user}", vec![], "。");
        assert!(matches!(result, Err(ModeConfigError::InvalidTemplate { .. })));
    }

    #[test]
    fn new_rejects_unbalanced_braces() {
        let result = ModeConfig::new("normal", "Normal", "{history", vec![], "。");
        assert!(matches!(result, Err(ModeConfigError::InvalidTemplate { .. })));
    }

    #[test]
    fn choose_seed_line_returns_member_of_set() {
        let mode = mode(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let line = mode.choose_seed_line(&mut rng).unwrap();
            assert!(["a", "b", "c"].contains(&line));
        }
    }

    #[test]
    fn choose_seed_line_on_empty_set_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(mode(&[]).choose_seed_line(&mut rng).is_none());
    }

    #[test]
    fn generators_transform_seed_lines() {
        assert_eq!(MessageGenerator::identity().generate("hi there"), "hi there");
        assert_eq!(MessageGenerator::quoted().generate("hi"), "「hi」");
        assert_eq!(
            MessageGenerator::from_kind(GeneratorKind::Quoted).generate("x"),
            "「x」"
        );
        let shout = MessageGenerator::new(|s| s.to_uppercase());
        assert_eq!(shout.generate("hey"), "HEY");
    }

    #[test]
    fn parse_seed_lines_trims_and_skips_blank_lines() {
        let lines = parse_seed_lines("  hello \n\n\tgood morning\n   \nbye");
        assert_eq!(lines, vec!["hello", "good morning", "bye"]);
    }

    #[test]
    fn parse_seed_lines_of_blank_file_is_empty() {
        assert!(parse_seed_lines("\n  \n").is_empty());
    }

    #[test]
    fn generator_kind_deserializes_lowercase() {
        let kind: GeneratorKind = serde_json::from_str("\"identity\"").unwrap();
        assert_eq!(kind, GeneratorKind::Identity);
    }
}
