// SPDX-License-Identifier: AGPL-3.0-or-later
//! Application configuration: optional TOML file, then environment

use anyhow::{Context, Result};
use repodoc_bridges::{github, llm, RetryPolicy, RetrySettings};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub request_timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_url: github::DEFAULT_API_URL.to_string(),
            llm_api_url: llm::DEFAULT_API_URL.to_string(),
            llm_model: llm::DEFAULT_MODEL.to_string(),
            request_timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

impl AppConfig {
    /// Read `path` if given, then apply `GITHUB_TOKEN` and `REPODOC_LLM_API_URL`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Override fields from environment lookups
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("GITHUB_TOKEN") {
            let token = token.trim().trim_matches('"').trim().to_string();
            if !token.is_empty() {
                self.github_token = Some(token);
            }
        }
        if let Some(url) = var("REPODOC_LLM_API_URL").filter(|url| !url.trim().is_empty()) {
            self.llm_api_url = url.trim().to_string();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(self.retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.llm_api_url, "http://0.0.0.0:4000");
        assert_eq!(config.llm_model, "llama2");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
llm_model = "mistral"
request_timeout_secs = 5

[retry]
max_attempts = 5
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.llm_model, "mistral");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.max_wait_secs, 10);
        assert_eq!(config.github_api_url, "https://api.github.com");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm_modle = \"typo\"").unwrap();
        assert!(AppConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("GITHUB_TOKEN", "  \"ghp_secret\"\n"),
            ("REPODOC_LLM_API_URL", "http://localhost:8080"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.github_token.as_deref(), Some("ghp_secret"));
        assert_eq!(config.llm_api_url, "http://localhost:8080");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config, AppConfig::default());
    }
}
