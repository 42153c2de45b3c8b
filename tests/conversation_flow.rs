//! Integration tests for a full conversation.
//!
//! These tests verify the end-to-end flow:
//! 1. A mode is loaded from the template store
//! 2. The first submit sends the templated prompt
//! 3. Automatic turns draw from the seed lines
//! 4. Later submits send the bare transcript as a continuation prompt
//!
//! Uses in-memory and temp-dir implementations to run without a generation server.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use local_chat::adapters::ai::MockGenerationService;
use local_chat::adapters::templates::{FileTemplateStore, InMemoryTemplateStore};
use local_chat::application::{ChatSession, ConversationEngine, EngineOptions, ModeLoader};
use local_chat::config::{default_modes, ModeDefinition};
use local_chat::domain::conversation::{
    GeneratorKind, MessageGenerator, ModeConfig, Speaker, SpeakerLabels,
};
use local_chat::ports::{
    ChunkStream, GenerationRequest, GenerationService, ServiceInfo, TemplateRecord,
    TemplateRepository, TransportError,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Service that slices every reply into fixed-size byte chunks, the way a
/// transport may split one JSON object across reads.
struct SlicingService {
    replies: Mutex<Vec<Vec<String>>>,
    slice: usize,
}

impl SlicingService {
    fn new(slice: usize, replies: Vec<Vec<&str>>) -> Self {
        let mut replies: Vec<Vec<String>> = replies
            .into_iter()
            .map(|objects| objects.into_iter().map(str::to_string).collect())
            .collect();
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            slice,
        }
    }
}

#[async_trait]
impl GenerationService for SlicingService {
    async fn stream_generate(&self, _request: GenerationRequest) -> Result<ChunkStream, TransportError> {
        let objects = self.replies.lock().unwrap().pop().unwrap_or_default();
        let mut chunks: Vec<Result<Bytes, TransportError>> = Vec::new();
        for object in objects {
            let bytes = object.into_bytes();
            if bytes.len() <= self.slice {
                chunks.push(Ok(Bytes::from(bytes)));
            } else {
                for piece in bytes.chunks(self.slice) {
                    chunks.push(Ok(Bytes::copy_from_slice(piece)));
                }
            }
        }
        Ok(Box::pin(stream::iter(chunks)))
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo::new("slicing", "test", "memory://")
    }
}

fn scenario_mode() -> ModeConfig {
    ModeConfig::new(
        "custom",
        "Custom",
        "A friendly chat.\n{history}\n{bot_name}:",
        vec!["hi there".to_string()],
        "。",
    )
    .unwrap()
    .with_message_generator(MessageGenerator::identity())
}

// =============================================================================
// Engine scenario
// =============================================================================

#[tokio::test]
async fn two_turn_session_switches_to_continuation_prompt() {
    let service = MockGenerationService::new()
        .with_raw_chunks([r#"{"response":"ok。"}"#])
        .with_raw_chunks([r#"{"response":"nice to meet you。"}"#]);
    let mut engine = ConversationEngine::new(
        Arc::new(service.clone()),
        scenario_mode(),
        EngineOptions::default(),
    );

    let first = engine.submit("hello").await.unwrap();
    assert_eq!(first.text, "ok。");
    assert!(!first.degraded);
    assert_eq!(service.prompts()[0], "A friendly chat.\nUser: hello\nBot:");

    let next = engine.generate_next().unwrap();
    assert_eq!(next, "hi there");

    let history_before = format!("{}\nUser: {}", engine.transcript().render(), next);
    engine.submit(&next).await.unwrap();

    assert_eq!(service.prompts()[1], format!("{}\nBot:", history_before));
    assert_eq!(
        service.prompts()[1],
        "User: hello\nBot: ok。\nUser: hi there\nBot:"
    );
    assert_eq!(engine.transcript().len(), 4);
}

#[tokio::test]
async fn split_objects_are_dropped_not_reassembled() {
    let service = SlicingService::new(
        20,
        vec![vec![
            r#"{"response":"Hello there, friend"}"#,
            r#"{"response":"。"}"#,
        ]],
    );
    let mut engine =
        ConversationEngine::new(Arc::new(service), scenario_mode(), EngineOptions::default());

    let reply = engine.submit("hello").await.unwrap();

    assert_eq!(reply.text, "。");
    assert!(!reply.degraded);
}

#[tokio::test]
async fn transport_failure_then_recovery() {
    let service = MockGenerationService::new()
        .with_stream_error_after(["par"], TransportError::stream("connection reset"))
        .with_fragments(["recovered。"]);
    let mut engine = ConversationEngine::new(
        Arc::new(service.clone()),
        scenario_mode(),
        EngineOptions::default(),
    );

    assert!(engine.submit("hello").await.is_err());
    assert_eq!(engine.transcript().render(), "User: hello");
    assert!(!engine.state().initial_prompt_sent());

    let reply = engine.submit("still there?").await.unwrap();
    assert_eq!(reply.text, "recovered。");
    assert_eq!(
        service.last_prompt().unwrap(),
        "A friendly chat.\nUser: hello\nUser: still there?\nBot:"
    );
}

// =============================================================================
// Session over the file store
// =============================================================================

#[tokio::test]
async fn session_runs_on_file_templates() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = FileTemplateStore::new(temp.path());
    store
        .save_template(&TemplateRecord::new("normal", "Roleplay.\n{history}\n{botName}:"))
        .await
        .unwrap();
    tokio::fs::write(
        temp.path().join("prompts/normal/default_you_lines.txt"),
        "good morning\n\n",
    )
    .await
    .unwrap();

    let service = MockGenerationService::new()
        .with_fragments(["「morning」"])
        .with_fragments(["「yes」"]);
    let mut modes = default_modes();
    modes.insert(
        "normal".to_string(),
        ModeDefinition::new("」").with_generator(GeneratorKind::Quoted),
    );
    let loader = ModeLoader::new(Arc::new(store), modes);
    let options = EngineOptions {
        labels: SpeakerLabels::new("You", "Aoi"),
        request_timeout: Duration::from_secs(5),
    };
    let session = ChatSession::start(Arc::new(service.clone()), loader, "normal", options)
        .await
        .unwrap();

    let turn = session.auto_turn().await.unwrap();
    session.submit("really?").await.unwrap();

    assert_eq!(turn.message, "「good morning」");
    assert_eq!(service.prompts()[0], "Roleplay.\nYou: 「good morning」\nAoi:");
    assert_eq!(
        service.prompts()[1],
        "You: 「good morning」\nAoi: 「morning」\nYou: really?\nAoi:"
    );

    let transcript = session.transcript().await;
    assert_eq!(transcript.last().unwrap().speaker(), Speaker::Bot);
}

#[tokio::test]
async fn saved_template_applies_to_next_mode_load() {
    let store = Arc::new(InMemoryTemplateStore::new());
    store.insert_mode("normal", "v1 {history}", "hi").await;
    let service = MockGenerationService::new()
        .with_fragments(["a」"])
        .with_fragments(["b」"]);
    let loader = ModeLoader::new(Arc::clone(&store), default_modes());
    let session = ChatSession::start(
        Arc::new(service.clone()),
        loader,
        "normal",
        EngineOptions::default(),
    )
    .await
    .unwrap();

    session.submit("one").await.unwrap();
    store
        .save_template(&TemplateRecord::new("normal", "v2 {history}"))
        .await
        .unwrap();
    session.switch_mode("normal").await.unwrap();
    session.submit("two").await.unwrap();

    assert_eq!(service.prompts()[0], "v1 User: one");
    assert_eq!(service.prompts()[1], "v2 User: two");
}
