//! Application state shared by the CLI commands and the HTTP server.
//!
//! Pins the core session manager and event pipeline to the concrete infra
//! backend and reply delivery.

use std::sync::Arc;

use chatbridge_core::backend::BoxAskBackend;
use chatbridge_core::bridge::{BoxReplier, ConversationHandler, EventDispatcher, HandlerConfig};
use chatbridge_core::chat::{ManagerConfig, SessionManager};
use chatbridge_infra::backend::ProxyBackend;
use chatbridge_infra::reply::build_replier;
use chatbridge_types::config::BridgeConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub sessions: Arc<SessionManager>,
    pub dispatcher: Arc<EventDispatcher>,
}

impl AppState {
    /// Wire the proxy backend and the configured reply delivery.
    pub fn build(config: BridgeConfig) -> anyhow::Result<Self> {
        let backend = ProxyBackend::from_config(&config.backend)?;
        let replier = build_replier(&config.server)?;

        tracing::debug!(
            endpoint = %backend.endpoint(),
            replier = replier.name(),
            "initializing application state"
        );

        Ok(Self::from_parts(
            config,
            BoxAskBackend::new(backend),
            replier,
        ))
    }

    pub fn from_parts(config: BridgeConfig, backend: BoxAskBackend, replier: BoxReplier) -> Self {
        let sessions = Arc::new(SessionManager::new(
            backend,
            ManagerConfig::from(&config.conversation),
        ));
        let handler = Arc::new(ConversationHandler::new(
            Arc::clone(&sessions),
            Arc::new(replier),
            HandlerConfig::from_config(&config),
        ));
        let dispatcher = Arc::new(EventDispatcher::new(
            handler,
            config.server.max_concurrent_events,
        ));

        Self {
            config: Arc::new(config),
            sessions,
            dispatcher,
        }
    }
}
