//! Configuration types for chatbridge.
//!
//! `BridgeConfig` represents the optional `config.toml` plus whatever the CLI
//! overrides on top of it. Every field has a default, so an empty file (or no
//! file at all) yields a usable configuration.

use serde::{Deserialize, Serialize};

/// Default maximum number of cached conversations.
pub const DEFAULT_MAX_CONVERSATIONS: usize = 1000;

/// Default time-to-live of a cached conversation (2 hours).
pub const DEFAULT_CONVERSATION_MAX_AGE_SECS: u64 = 2 * 60 * 60;

/// Default number of turns retained per conversation.
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Default instruction context; `{date}` is replaced with the current date.
pub const DEFAULT_CONTEXT: &str =
    "Instructions:\nYou are ChatGPT, a large language model trained by OpenAI.\nCurrent date: {date}";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub conversation: ConversationSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub server: ServerConfig,
}

/// AI backend connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API key sent as a bearer token. Never logged.
    #[serde(default)]
    pub api_key: String,
    /// Direct API endpoint, kept for reference in the startup banner.
    #[serde(default)]
    pub api_server: Option<String>,
    /// Endpoint the bridge actually POSTs questions to.
    #[serde(default = "default_proxy_api_server")]
    pub proxy_api_server: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Hand-written so the API key never reaches logs through `{:?}`.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"[redacted]")
            .field("api_server", &self.api_server)
            .field("proxy_api_server", &self.proxy_api_server)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_proxy_api_server() -> String {
    "http://127.0.0.1:3000/conversation".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_server: None,
            proxy_api_server: default_proxy_api_server(),
            model: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Conversation cache and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSettings {
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// Turns retained per chat by the event pipeline.
    #[serde(default = "default_chat_max_messages")]
    pub chat_max_messages: usize,
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default)]
    pub language: Option<String>,
}

fn default_max_conversations() -> usize {
    DEFAULT_MAX_CONVERSATIONS
}

fn default_max_age_secs() -> u64 {
    DEFAULT_CONVERSATION_MAX_AGE_SECS
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_chat_max_messages() -> usize {
    50
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_conversations: default_max_conversations(),
            max_age_secs: default_max_age_secs(),
            max_messages: default_max_messages(),
            chat_max_messages: default_chat_max_messages(),
            context: default_context(),
            language: None,
        }
    }
}

/// Fixed-delay retry settings for backend round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay_secs() -> u64 {
    3
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

/// Webhook server and event pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// When set, inbound events must carry `Authorization: Bearer <token>`.
    #[serde(default)]
    pub verification_token: Option<String>,
    /// Public URL of this server, printed at startup.
    #[serde(default)]
    pub site_url: Option<String>,
    /// Endpoint replies are POSTed to; replies are only logged when unset.
    #[serde(default)]
    pub reply_url: Option<String>,
    /// The bot's own account id, used to recognise mentions in group chats.
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default = "default_max_concurrent_events")]
    pub max_concurrent_events: usize,
    #[serde(default = "default_busy_message")]
    pub busy_message: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_path() -> String {
    "/".to_string()
}

fn default_command_prefix() -> String {
    "/chatgpt".to_string()
}

fn default_max_concurrent_events() -> usize {
    64
}

fn default_busy_message() -> String {
    "The assistant is busy right now, please try again later.".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_path: default_api_path(),
            verification_token: None,
            site_url: None,
            reply_url: None,
            bot_id: None,
            command_prefix: default_command_prefix(),
            max_concurrent_events: default_max_concurrent_events(),
            busy_message: default_busy_message(),
        }
    }
}
