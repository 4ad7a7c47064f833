// SPDX-License-Identifier: AGPL-3.0-or-later
//! Analysis generation through an OpenAI-compatible chat endpoint

use crate::github::RepositorySnapshot;
use crate::retry::RetryPolicy;
use crate::{BridgeError, Result};
use async_trait::async_trait;
use repodoc_core::Locale;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://0.0.0.0:4000";
pub const DEFAULT_MODEL: &str = "llama2";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Opening instruction, indexed by `Locale as usize`
static INSTRUCTIONS: [&str; 5] = [
    "Analyze this repository and provide a detailed summary in English.",
    "Analiza este repositorio y proporciona un resumen detallado en español.",
    "Analysez ce dépôt et fournissez un résumé détaillé en français.",
    "Analysieren Sie dieses Repository und erstellen Sie eine detaillierte Zusammenfassung auf Deutsch.",
    "请用中文分析这个代码仓库并提供详细总结。",
];

const REQUESTED_SECTIONS: &str = "\
Please provide:
1. A clear description of the repository's purpose and main functionality
2. Key features and capabilities
3. Important dependencies and technical requirements
4. Main workflows or usage patterns
5. Notable code organization and architecture decisions

Format the response in Markdown.";

/// Produces report markdown for a repository
#[async_trait]
pub trait AnalysisGenerator: Send + Sync {
    async fn generate(&self, snapshot: &RepositorySnapshot, locale: Locale) -> Result<String>;
}

/// User prompt for one repository in one locale
pub fn build_prompt(snapshot: &RepositorySnapshot, locale: Locale) -> String {
    let metadata = &snapshot.metadata;
    let languages = snapshot.languages.names().collect::<Vec<_>>().join(", ");
    let files = snapshot.file_structure();

    format!(
        "{instruction}\n\n\
         Repository Information:\n\
         - Name: {name}\n\
         - Description: {description}\n\
         - Primary Language: {language}\n\
         - Languages Used: {languages}\n\n\
         README Content:\n{readme}\n\n\
         File Structure:\n{files}\n\n\
         {REQUESTED_SECTIONS}",
        instruction = INSTRUCTIONS[locale as usize],
        name = metadata.name,
        description = metadata.description.as_deref().unwrap_or_default(),
        language = metadata.language.as_deref().unwrap_or_default(),
        readme = snapshot.readme.as_deref().unwrap_or("No README available"),
        files = if files.is_empty() {
            "No file structure available"
        } else {
            files.as_str()
        },
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Chat-completions client
pub struct LlmClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_url: &str, model: &str) -> Result<Self> {
        Self::with_timeout(api_url, model, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    pub fn with_timeout(api_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url)
    }

    async fn complete_once(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self
            .http
            .post(self.completions_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "LLM API error");
            return Err(BridgeError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let reply: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| BridgeError::Decode(format!("chat completion: {e}")))?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BridgeError::Decode("chat completion has no choices".into()))
    }
}

#[async_trait]
impl AnalysisGenerator for LlmClient {
    async fn generate(&self, snapshot: &RepositorySnapshot, locale: Locale) -> Result<String> {
        let system = format!(
            "You are a helpful assistant that analyzes GitHub repositories. Respond in {locale}."
        );
        let prompt = build_prompt(snapshot, locale);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::info!(%locale, repo = %snapshot.repo, model = %self.model, "requesting analysis");
        let analysis = self
            .retry
            .run("generate analysis", || self.complete_once(&request))
            .await?;
        tracing::debug!(chars = analysis.chars().count(), "received analysis");
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{ContentEntry, Languages, RepoMetadata, RepoRef};
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn snapshot(readme: Option<&str>) -> RepositorySnapshot {
        RepositorySnapshot {
            repo: RepoRef {
                owner: "octo".into(),
                repo: "widget".into(),
            },
            metadata: RepoMetadata {
                name: "widget".into(),
                description: Some("A widget".into()),
                language: Some("Rust".into()),
                stargazers_count: 1,
                forks_count: 0,
            },
            languages: Languages::from(HashMap::from([
                ("Rust".to_string(), 90),
                ("Shell".to_string(), 10),
            ])),
            readme: readme.map(str::to_string),
            contents: vec![ContentEntry {
                name: "src".into(),
                path: "src".into(),
                kind: "dir".into(),
                size: 0,
            }],
        }
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_prompt(&snapshot(Some("# Widget")), Locale::En);
        assert!(prompt.starts_with("Analyze this repository"));
        assert!(prompt.contains("- Name: widget\n"));
        assert!(prompt.contains("- Languages Used: Rust, Shell\n"));
        assert!(prompt.contains("README Content:\n# Widget\n"));
        assert!(prompt.contains("File Structure:\n- src\n"));
        assert!(prompt.ends_with("Format the response in Markdown."));
    }

    #[test]
    fn test_prompt_fallbacks() {
        let mut snap = snapshot(None);
        snap.contents.clear();
        let prompt = build_prompt(&snap, Locale::Zh);
        assert!(prompt.starts_with("请用中文分析"));
        assert!(prompt.contains("No README available"));
        assert!(prompt.contains("No file structure available"));
    }

    #[test]
    fn test_every_locale_has_an_instruction() {
        for locale in Locale::ALL {
            assert!(!INSTRUCTIONS[locale as usize].is_empty());
        }
        assert!(INSTRUCTIONS[Locale::De as usize].ends_with("auf Deutsch."));
    }

    #[tokio::test]
    async fn test_generate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({"model": "llama2", "max_tokens": 1000})),
                Matcher::Regex("Respond in fr\\.".into()),
                Matcher::Regex("Analysez ce dépôt".into()),
            ]))
            .with_status(200)
            .with_body(r##"{"choices":[{"message":{"role":"assistant","content":"# Analyse"}}]}"##)
            .create_async()
            .await;

        let client = LlmClient::new(&server.url(), DEFAULT_MODEL).unwrap();
        let analysis = client.generate(&snapshot(None), Locale::Fr).await.unwrap();
        assert_eq!(analysis, "# Analyse");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_choices_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .expect(1)
            .create_async()
            .await;

        let client = LlmClient::new(&server.url(), DEFAULT_MODEL)
            .unwrap()
            .with_retry(RetryPolicy::immediate(3));
        let err = client.generate(&snapshot(None), Locale::En).await.unwrap_err();
        assert!(matches!(err, BridgeError::Decode(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unavailable_service_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let client = LlmClient::new(&server.url(), DEFAULT_MODEL)
            .unwrap()
            .with_retry(RetryPolicy::immediate(2));
        let err = client.generate(&snapshot(None), Locale::En).await.unwrap_err();
        assert!(matches!(err, BridgeError::UpstreamUnavailable { attempts: 2, .. }));
        mock.assert_async().await;
    }
}
