//! Runtime for executing dialogue turns
//!
//! Each caller gets its own session, keyed by an id issued on first contact.
//! Sessions live in memory only and are evicted after an idle timeout.

mod executor;
pub mod traits;


use executor::{GenerationRequest, Outcome, Session};
pub use traits::*;

use crate::config::DialogueConfig;
use crate::llm::LlmError;
use crate::state_machine::{Event, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Floor for the sweep period; `tokio::time::interval` rejects zero
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Result of one successful `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub session_id: String,
    pub message: String,
    pub selfie_hint: Option<String>,
}

/// Errors surfaced to the HTTP layer
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("{0}")]
    Upstream(#[from] LlmError),
    #[error("A reply is still being generated for this session, try again shortly")]
    Busy,
    #[error("{0}")]
    Internal(String),
}

impl From<TransitionError> for DialogueError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Busy => DialogueError::Busy,
            TransitionError::InvalidTransition(msg) => DialogueError::Internal(msg),
        }
    }
}

type SharedSession = Arc<Mutex<Session>>;

/// Manager for all dialogue sessions
pub struct SessionManager {
    generator: Arc<dyn ReplyGenerator>,
    config: DialogueConfig,
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionManager {
    pub fn new(generator: Arc<dyn ReplyGenerator>, config: DialogueConfig) -> Self {
        Self {
            generator,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get a session by id, or create one under a fresh id
    async fn get_or_create(&self, session_id: Option<&str>) -> (String, SharedSession) {
        if let Some(id) = session_id {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                // Touched while the map guard is held, so a sweep cannot evict
                // the session between lookup and the turn taking its lock. A
                // session locked right now is mid-turn and gets touched there.
                if let Ok(mut guard) = session.try_lock() {
                    guard.touch();
                }
                return (id.to_string(), session.clone());
            }
            tracing::debug!(session_id = %id, "Unknown session, issuing a new one");
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(Session::new()));
        self.sessions
            .write()
            .await
            .insert(id.clone(), session.clone());
        tracing::info!(session_id = %id, "Session created");
        (id, session)
    }

    /// Feed one utterance into the caller's dialogue
    pub async fn advance(
        &self,
        session_id: Option<&str>,
        text: String,
    ) -> Result<Turn, DialogueError> {
        let (id, session) = self.get_or_create(session_id).await;

        let mut outcome = {
            let mut guard = session.lock().await;
            guard.touch();
            guard.handle(Event::user_message(text))?
        };

        if let Some(request) = outcome.generation.take() {
            // Spawned so a dropped request still settles the session state
            let task = tokio::spawn(Self::finish_generation(
                self.generator.clone(),
                session.clone(),
                request,
            ));
            outcome = match task.await {
                Ok(result) => result?,
                Err(e) => {
                    tracing::error!(session_id = %id, error = %e, "Generation task failed");
                    let mut guard = session.lock().await;
                    guard.handle(Event::generation_failed(e.to_string()))?;
                    return Err(DialogueError::Internal(e.to_string()));
                }
            };
        }

        if outcome.pause {
            self.pause().await;
        }

        let reply = outcome.reply.ok_or_else(|| {
            DialogueError::Internal("Dialogue turn produced no reply".to_string())
        })?;

        Ok(Turn {
            session_id: id,
            message: reply.message,
            selfie_hint: reply.selfie_hint,
        })
    }

    /// Call the generator without holding the session lock, then apply the result
    async fn finish_generation(
        generator: Arc<dyn ReplyGenerator>,
        session: SharedSession,
        request: GenerationRequest,
    ) -> Result<Outcome, DialogueError> {
        let result = generator
            .generate(&request.system_prompt, &request.user_messages)
            .await;

        let mut guard = session.lock().await;
        guard.touch();
        match result {
            Ok(text) => Ok(guard.handle(Event::reply_generated(text))?),
            Err(e) => {
                let outcome = guard.handle(Event::generation_failed(e.message.clone()))?;
                tracing::error!(
                    error = outcome.failure.as_deref().unwrap_or_default(),
                    kind = e.kind.as_str(),
                    state = ?guard.state(),
                    "Reply generation failed"
                );
                Err(DialogueError::Upstream(e))
            }
        }
    }

    async fn pause(&self) {
        if !self.config.reply_delay.is_zero() {
            tokio::time::sleep(self.config.reply_delay).await;
        }
    }

    /// Drop sessions idle for longer than the configured TTL
    pub async fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now()).await
    }

    async fn evict_expired_at(&self, now: Instant) -> usize {
        let ttl = self.config.session_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // A session locked right now is mid-turn, so it is kept
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => !guard.is_expired(now, ttl),
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Periodically evict idle sessions. `every` is raised to at least one second.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let every = every.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                manager.evict_expired().await;
            }
        })
    }

    #[allow(dead_code)] // Used by tests
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Snapshot of a session's state, for tests and diagnostics
    #[allow(dead_code)] // Used by tests
    pub async fn snapshot(&self, session_id: &str) -> Option<(usize, Vec<String>)> {
        let session = self.sessions.read().await.get(session_id).cloned()?;
        let guard = session.lock().await;
        Some((
            guard.state().step(),
            guard.transcript().responses().to_vec(),
        ))
    }
}
