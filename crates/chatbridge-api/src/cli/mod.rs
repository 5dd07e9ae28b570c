//! CLI command definitions for the `chatbridge` binary.
//!
//! Every configuration override is also readable from the environment, so a
//! container can be configured without a config file.

pub mod ask;
pub mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use chatbridge_types::config::{BridgeConfig, ServerConfig};

/// Bridge group and direct chats to a conversational AI backend.
#[derive(Parser)]
#[command(name = "chatbridge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file. Missing or malformed files fall back to defaults.
    #[arg(long, global = true, env = "CHATBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server.
    Serve(ServeArgs),

    /// Ask a single question through the configured backend.
    Ask {
        /// Question text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Conversation to ask in.
        #[arg(long, default_value = "cli")]
        chat_id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Backend and conversation overrides shared by every command.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// API key sent to the backend as a bearer token.
    #[arg(long, global = true, env = "CHATGPT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Endpoint questions are POSTed to.
    #[arg(long, global = true, env = "PROXY_API_SERVER")]
    pub proxy_api_server: Option<String>,

    #[arg(long, global = true, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Instruction context; `{date}` is replaced with today's date.
    #[arg(long, global = true, env = "CHATGPT_CONTEXT_MESSAGE")]
    pub context: Option<String>,

    /// Language the assistant is asked to answer in.
    #[arg(long, global = true, env = "CHATGPT_LANGUAGE")]
    pub language: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(key) = &self.api_key {
            config.backend.api_key = key.clone();
        }
        if let Some(server) = &self.proxy_api_server {
            config.backend.proxy_api_server = server.clone();
        }
        if let Some(model) = &self.model {
            config.backend.model = Some(model.clone());
        }
        if let Some(context) = &self.context {
            config.conversation.context = context.clone();
        }
        if let Some(language) = &self.language {
            config.conversation.language = Some(language.clone());
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Path inbound chat events are POSTed to.
    #[arg(long, env = "API_PATH")]
    pub api_path: Option<String>,

    /// The bot's account id, used to recognise mentions in group chats.
    #[arg(long, env = "BOT_OPEN_ID")]
    pub bot_id: Option<String>,

    /// Bearer token inbound events must carry.
    #[arg(long, env = "VERIFICATION_TOKEN", hide_env_values = true)]
    pub verification_token: Option<String>,

    /// Public URL of this server, shown at startup.
    #[arg(long, env = "SITE_URL")]
    pub site_url: Option<String>,

    /// Endpoint replies are POSTed to; replies are only logged when unset.
    #[arg(long, env = "REPLY_URL")]
    pub reply_url: Option<String>,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = &self.api_path {
            config.api_path = path.clone();
        }
        if self.bot_id.is_some() {
            config.bot_id = self.bot_id.clone();
        }
        if self.verification_token.is_some() {
            config.verification_token = self.verification_token.clone();
        }
        if self.site_url.is_some() {
            config.site_url = self.site_url.clone();
        }
        if self.reply_url.is_some() {
            config.reply_url = self.reply_url.clone();
        }
    }
}
