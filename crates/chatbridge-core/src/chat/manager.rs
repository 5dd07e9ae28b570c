//! Session manager: bounded expiring cache of conversation sessions.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use chatbridge_types::config::{
    ConversationSettings, DEFAULT_CONTEXT, DEFAULT_CONVERSATION_MAX_AGE_SECS,
    DEFAULT_MAX_CONVERSATIONS, DEFAULT_MAX_MESSAGES,
};
use chatbridge_types::error::SessionError;

use super::session::{ConversationSession, SessionConfig};
use crate::backend::BoxAskBackend;
use crate::cache::ExpiringCache;

/// Defaults applied to every session the manager creates.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub max_conversations: usize,
    pub max_age: Duration,
    pub max_messages: usize,
    pub context: String,
    pub language: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            max_age: Duration::from_secs(DEFAULT_CONVERSATION_MAX_AGE_SECS),
            max_messages: DEFAULT_MAX_MESSAGES,
            context: DEFAULT_CONTEXT.to_string(),
            language: None,
        }
    }
}

impl From<&ConversationSettings> for ManagerConfig {
    fn from(settings: &ConversationSettings) -> Self {
        Self {
            max_conversations: settings.max_conversations,
            max_age: Duration::from_secs(settings.max_age_secs),
            max_messages: settings.max_messages,
            context: settings.context.clone(),
            language: settings.language.clone(),
        }
    }
}

/// Owns every live conversation session, keyed by chat identifier.
///
/// Sessions expire a fixed `max_age` after creation; reading a session does
/// not extend its lifetime. When the cache is full the least recently used
/// session is dropped along with its message log and dedup ledger.
pub struct SessionManager {
    backend: Arc<BoxAskBackend>,
    sessions: ExpiringCache<String, Arc<ConversationSession>>,
    config: ManagerConfig,
}

impl SessionManager {
    pub fn new(backend: BoxAskBackend, config: ManagerConfig) -> Self {
        Self::with_shared_backend(Arc::new(backend), config)
    }

    pub fn with_shared_backend(backend: Arc<BoxAskBackend>, config: ManagerConfig) -> Self {
        Self {
            sessions: ExpiringCache::new(config.max_conversations),
            backend,
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Return the live session for `chat_id`, creating it on a miss.
    ///
    /// The cache key is `config.id` when set, otherwise `chat_id`. On a hit
    /// `config` is ignored. Concurrent misses for the same key create exactly
    /// one session.
    pub fn get_or_create(
        &self,
        chat_id: &str,
        config: SessionConfig,
    ) -> Result<Arc<ConversationSession>, SessionError> {
        let id = config
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| chat_id.to_string());
        let ttl = config.max_age.unwrap_or(self.config.max_age);

        self.sessions.get_or_try_insert_with(id.clone(), ttl, || {
            let resolved = self.resolve(config, ttl);
            let session = ConversationSession::new(id.clone(), Arc::clone(&self.backend), resolved)?;
            debug!(session_id = %id, ttl_secs = ttl.as_secs(), "created conversation session");
            Ok(Arc::new(session))
        })
    }

    /// Peek at a live session without creating one.
    pub fn get(&self, chat_id: &str) -> Option<Arc<ConversationSession>> {
        self.sessions.get(&chat_id.to_string())
    }

    /// Drop one session; absent sessions are not an error.
    pub fn reset_one(&self, chat_id: &str) {
        self.sessions.delete(&chat_id.to_string());
        info!(chat_id, "conversation session reset");
    }

    /// Drop every session.
    pub fn reset_all(&self) {
        self.sessions.clear();
        info!("all conversation sessions reset");
    }

    /// Number of cached sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn resolve(&self, config: SessionConfig, ttl: Duration) -> SessionConfig {
        SessionConfig {
            max_messages: config.max_messages.or(Some(self.config.max_messages)),
            max_age: Some(ttl),
            context: config.context.or_else(|| Some(self.config.context.clone())),
            language: config.language.or_else(|| self.config.language.clone()),
            ..config
        }
    }
}
