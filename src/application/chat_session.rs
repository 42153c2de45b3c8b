//! Chat session - one engine shared behind an async lock.
//!
//! Every operation takes the lock for its whole duration, so a second
//! `submit` waits for the first to finish and a mode switch can never land
//! in the middle of an exchange.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::engine::{ConversationEngine, EngineOptions, Reply};
use super::errors::SessionError;
use super::mode_loader::ModeLoader;
use crate::domain::conversation::{ModeConfig, Transcript};
use crate::domain::foundation::SessionId;
use crate::ports::{GenerationService, TemplateRepository};

/// Result of one automatic turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoTurn {
    /// Message generated from the mode's seed lines and sent as the user.
    pub message: String,
    pub reply: Reply,
}

/// A conversation that can be driven by a user or by itself.
pub struct ChatSession<S, T>
where
    S: GenerationService + ?Sized,
    T: TemplateRepository + ?Sized,
{
    id: SessionId,
    engine: Mutex<ConversationEngine<S>>,
    loader: ModeLoader<T>,
}

impl<S, T> ChatSession<S, T>
where
    S: GenerationService + ?Sized,
    T: TemplateRepository + ?Sized,
{
    /// Loads `mode_id` and starts a session in it.
    pub async fn start(
        service: Arc<S>,
        loader: ModeLoader<T>,
        mode_id: &str,
        options: EngineOptions,
    ) -> Result<Self, SessionError> {
        let mode = loader.load(mode_id).await?;
        let id = SessionId::new();
        let info = service.service_info();
        tracing::info!(
            session_id = %id,
            mode = %mode_id,
            service = %info.name,
            model = %info.model,
            "Chat session started"
        );

        Ok(Self {
            id,
            engine: Mutex::new(ConversationEngine::new(service, mode, options)),
            loader,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Sends user text and waits for the reply.
    pub async fn submit(&self, text: &str) -> Result<Reply, SessionError> {
        let mut engine = self.engine.lock().await;
        Ok(engine.submit(text).await?)
    }

    /// Generates a message from the seed lines and submits it, under one lock.
    pub async fn auto_turn(&self) -> Result<AutoTurn, SessionError> {
        let mut engine = self.engine.lock().await;
        let message = engine.generate_next()?;
        let reply = engine.submit(&message).await?;
        Ok(AutoTurn { message, reply })
    }

    /// Runs `turns` automatic turns, pausing `interval` between them.
    ///
    /// Stops at the first error; turns completed before it stay in the
    /// transcript.
    pub async fn auto_converse(
        &self,
        turns: usize,
        interval: Duration,
    ) -> Result<Vec<AutoTurn>, SessionError> {
        let mut completed = Vec::with_capacity(turns);
        for index in 0..turns {
            if index > 0 {
                tokio::time::sleep(interval).await;
            }
            match self.auto_turn().await {
                Ok(turn) => completed.push(turn),
                Err(err) => {
                    tracing::warn!(
                        session_id = %self.id,
                        completed = completed.len(),
                        error = %err,
                        "Auto conversation stopped"
                    );
                    return Err(err);
                }
            }
        }
        Ok(completed)
    }

    /// Switches to another mode, discarding the transcript.
    ///
    /// The new mode is loaded before the lock is taken; a load failure
    /// leaves the session untouched.
    pub async fn switch_mode(&self, mode_id: &str) -> Result<(), SessionError> {
        let mode = self.loader.load(mode_id).await?;
        self.engine.lock().await.switch_mode(mode);
        Ok(())
    }

    /// Snapshot of the transcript.
    pub async fn transcript(&self) -> Transcript {
        self.engine.lock().await.transcript().clone()
    }

    pub async fn current_mode(&self) -> ModeConfig {
        self.engine.lock().await.mode().clone()
    }

    /// Configured mode ids, sorted.
    pub fn list_modes(&self) -> Vec<String> {
        self.loader.list_modes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerationService;
    use crate::adapters::templates::InMemoryTemplateStore;
    use crate::application::errors::EngineError;
    use crate::config::{default_modes, ConfigError};
    use crate::domain::conversation::Speaker;
    use crate::ports::TransportError;

    type TestSession = ChatSession<MockGenerationService, InMemoryTemplateStore>;

    async fn session(service: MockGenerationService) -> TestSession {
        let store = InMemoryTemplateStore::new();
        store
            .insert_mode("normal", "Talk:\n{history}\n{bot_name}:", "hi there")
            .await;
        store.insert_mode("custom", "Story:\n{history}", "").await;
        let loader = ModeLoader::new(Arc::new(store), default_modes());

        ChatSession::start(Arc::new(service), loader, "normal", EngineOptions::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn start_fails_for_unknown_mode() {
        let loader = ModeLoader::new(Arc::new(InMemoryTemplateStore::new()), default_modes());

        let result: Result<TestSession, _> = ChatSession::start(
            Arc::new(MockGenerationService::new()),
            loader,
            "nope",
            EngineOptions::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::UnknownMode(_)))
        ));
    }

    #[tokio::test]
    async fn auto_turn_sends_generated_message() {
        let service = MockGenerationService::new().with_fragments(["hello」"]);
        let session = session(service.clone()).await;

        let turn = session.auto_turn().await.unwrap();

        assert_eq!(turn.message, "hi there");
        assert_eq!(turn.reply.text, "hello」");
        assert_eq!(service.last_prompt().unwrap(), "Talk:\nUser: hi there\nBot:");
    }

    #[tokio::test]
    async fn auto_turn_with_empty_seed_set_fails() {
        let session = session(MockGenerationService::new()).await;
        session.switch_mode("custom").await.unwrap();

        let result = session.auto_turn().await;

        assert!(matches!(
            result,
            Err(SessionError::Engine(EngineError::EmptySeedSet(_)))
        ));
        assert!(session.transcript().await.is_empty());
    }

    #[tokio::test]
    async fn auto_converse_runs_requested_turns() {
        let service = MockGenerationService::new()
            .with_fragments(["one」"])
            .with_fragments(["two」"])
            .with_fragments(["three」"]);
        let session = session(service.clone()).await;

        let turns = session
            .auto_converse(3, Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].reply.text, "three」");
        assert_eq!(session.transcript().await.len(), 6);
        assert_eq!(service.call_count(), 3);
    }

    #[tokio::test]
    async fn auto_converse_stops_at_first_error() {
        let service = MockGenerationService::new()
            .with_fragments(["one」"])
            .with_error(TransportError::status(503, "busy"))
            .with_fragments(["never」"]);
        let session = session(service.clone()).await;

        let result = session.auto_converse(3, Duration::from_millis(1)).await;

        assert!(matches!(
            result,
            Err(SessionError::Engine(EngineError::Transport(_)))
        ));
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn switch_mode_clears_transcript() {
        let service = MockGenerationService::new().with_fragments(["ok」"]);
        let session = session(service).await;
        session.submit("hello").await.unwrap();

        session.switch_mode("custom").await.unwrap();

        assert!(session.transcript().await.is_empty());
        assert_eq!(session.current_mode().await.id(), "custom");
    }

    #[tokio::test]
    async fn failed_switch_keeps_current_mode() {
        let service = MockGenerationService::new().with_fragments(["ok」"]);
        let session = session(service).await;
        session.submit("hello").await.unwrap();

        let result = session.switch_mode("poem").await;

        assert!(result.is_err());
        assert_eq!(session.current_mode().await.id(), "normal");
        assert_eq!(session.transcript().await.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_submits_do_not_interleave() {
        let service = MockGenerationService::new()
            .with_fragments(["first」"])
            .with_fragments(["second」"])
            .with_delay(Duration::from_millis(20));
        let session = Arc::new(session(service).await);

        let a = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit("a").await.map(|_| ()) }
        });
        let b = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit("b").await.map(|_| ()) }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let transcript = session.transcript().await;
        let speakers: Vec<Speaker> = transcript.turns().iter().map(|t| t.speaker()).collect();
        assert_eq!(
            speakers,
            vec![Speaker::User, Speaker::Bot, Speaker::User, Speaker::Bot]
        );
    }

    #[tokio::test]
    async fn list_modes_reports_configured_modes() {
        let session = session(MockGenerationService::new()).await;
        assert_eq!(session.list_modes(), vec!["custom", "normal"]);
    }
}
