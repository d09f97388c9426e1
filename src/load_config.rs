use crate::config::AppConfig;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable holding the completion service API key.
pub const API_KEY_VAR: &str = "COMPLETION_API_KEY";

/// Loads a static YAML config file (no secrets) and injects the API key from the environment.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let config = read_config_file(path)?;
    inject_api_key(config)
}

/// Loads a static YAML config file without requiring any secret.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: AppConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    Ok(config)
}

/// Default configuration plus the API key from the environment.
pub fn load_config_from_env() -> Result<AppConfig> {
    info!("No config file given, using defaults");
    inject_api_key(AppConfig::default())
}

fn inject_api_key(mut config: AppConfig) -> Result<AppConfig> {
    config.completion.api_key = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => {
            info!("{API_KEY_VAR} found in env");
            key
        }
        Ok(_) => {
            error!("{API_KEY_VAR} is set but empty");
            anyhow::bail!("{API_KEY_VAR} environment variable is empty");
        }
        Err(e) => {
            error!(error = ?e, "{API_KEY_VAR} environment variable not set");
            anyhow::bail!("{API_KEY_VAR} environment variable not set: {e}");
        }
    };
    config.trace_loaded();
    Ok(config)
}
