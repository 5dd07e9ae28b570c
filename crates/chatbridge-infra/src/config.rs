//! Configuration file loader for chatbridge.
//!
//! Reads an optional TOML file into [`BridgeConfig`]. Falls back to defaults
//! when no file is given, the file is missing, or it fails to parse.

use std::path::Path;

use chatbridge_types::config::BridgeConfig;

/// Load configuration from `path`.
///
/// - `None` or a missing file yields [`BridgeConfig::default()`].
/// - A file that cannot be read or parsed is logged at `warn` and also
///   yields the default.
pub async fn load_bridge_config(path: Option<&Path>) -> BridgeConfig {
    let Some(config_path) = path else {
        return BridgeConfig::default();
    };

    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return BridgeConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BridgeConfig::default();
        }
    };

    match toml::from_str::<BridgeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BridgeConfig::default()
        }
    }
}
