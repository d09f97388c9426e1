use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_COMPLETION_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub completion: CompletionConfig,
}

impl AppConfig {
    pub fn trace_loaded(&self) {
        info!(
            github_api = %self.github.api_base,
            completion_base_url = %self.completion.base_url,
            model = %self.completion.model,
            api_key_set = !self.completion.api_key.is_empty(),
            "Loaded AppConfig"
        );
        debug!(config = ?self, "AppConfig loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API.to_string(),
            user_agent: concat!("repo-medal/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

/// Connection settings for the completion service.
///
/// The API key never comes from the config file; it is injected from the
/// environment by [`crate::load_config`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            timeout_secs: 120,
            api_key: String::new(),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_api_key() {
        let config = CompletionConfig {
            api_key: "sk-secret".into(),
            ..CompletionConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("completion:\n  model: gpt-4o-mini\n").unwrap();
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.base_url, DEFAULT_COMPLETION_BASE_URL);
        assert_eq!(config.github.api_base, DEFAULT_GITHUB_API);
    }
}
