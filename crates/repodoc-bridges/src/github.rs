// SPDX-License-Identifier: AGPL-3.0-or-later
//! GitHub REST client
//!
//! Collects what the analysis prompt needs: repository metadata, the
//! language breakdown, the README and the top-level file list.

use crate::retry::RetryPolicy;
use crate::{BridgeError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("repodoc/", env!("CARGO_PKG_VERSION"));

/// Owner and name of a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Split a GitHub URL into owner and repository
///
/// The last two path segments are used, so deep links into a repository
/// are not supported. A trailing slash and a `.git` suffix are ignored.
pub fn parse_github_url(url: &str) -> Result<RepoRef> {
    let invalid = || BridgeError::InvalidUrl(url.to_string());

    let (_, path) = url.trim().split_once("github.com").ok_or_else(invalid)?;
    let segments: Vec<&str> = path
        .trim_start_matches([':', '/'])
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [.., owner, repo] => {
            let repo = repo.strip_suffix(".git").unwrap_or(*repo);
            if repo.is_empty() {
                return Err(invalid());
            }
            Ok(RepoRef {
                owner: (*owner).to_string(),
                repo: repo.to_string(),
            })
        }
        _ => Err(invalid()),
    }
}

/// The fields of `GET /repos/{owner}/{repo}` that reports use
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepoMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Primary language as GitHub detects it
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
}

/// Bytes of code per language, largest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Languages(Vec<(String, u64)>);

impl Languages {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, u64>> for Languages {
    fn from(map: HashMap<String, u64>) -> Self {
        let mut entries: Vec<(String, u64)> = map.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self(entries)
    }
}

/// Serialised as a JSON object, keeping the size order
impl Serialize for Languages {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, bytes)| (name, bytes)))
    }
}

/// One entry of a contents listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
}

/// The contents endpoint answers with an object for a single file
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Many(Vec<ContentEntry>),
    One(ContentEntry),
}

#[derive(Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: String,
}

/// Everything fetched about one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub repo: RepoRef,
    pub metadata: RepoMetadata,
    pub languages: Languages,
    pub readme: Option<String>,
    pub contents: Vec<ContentEntry>,
}

impl RepositorySnapshot {
    /// One `- path` line per top-level entry
    pub fn file_structure(&self) -> String {
        self.contents
            .iter()
            .map(|entry| format!("- {}", entry.path))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Anything that can describe a repository
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn fetch(&self, repo: &RepoRef) -> Result<RepositorySnapshot>;
}

/// GitHub REST API client
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Create a client for `base_url`; blank tokens count as absent
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    pub fn with_timeout(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let token = token.map(clean_token).filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!("no GitHub token provided, API rate limits will be restricted");
        }
        tracing::info!(token = token.is_some(), base_url, "initialised GitHub client");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn repo_url(&self, repo: &RepoRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo),
            suffix
        )
    }

    /// One GET; `Ok(None)` on 404 when `allow_missing`
    async fn get_once<T: DeserializeOwned>(&self, url: &str, allow_missing: bool) -> Result<Option<T>> {
        let mut request = self.http.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if allow_missing && status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), url, "GitHub API error");
            return Err(BridgeError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| BridgeError::Decode(format!("{url}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &'static str, url: &str) -> Result<T> {
        tracing::info!(url, "{operation}");
        self.retry
            .run(operation, || self.get_once(url, false))
            .await?
            .ok_or_else(|| BridgeError::Decode(format!("{url}: empty response")))
    }

    pub async fn metadata(&self, repo: &RepoRef) -> Result<RepoMetadata> {
        self.get_json("fetch repository metadata", &self.repo_url(repo, ""))
            .await
    }

    pub async fn languages(&self, repo: &RepoRef) -> Result<Languages> {
        let map: HashMap<String, u64> = self
            .get_json("fetch languages", &self.repo_url(repo, "/languages"))
            .await?;
        Ok(Languages::from(map))
    }

    /// Decoded README text, `None` when the repository has none
    pub async fn readme(&self, repo: &RepoRef) -> Result<Option<String>> {
        let url = self.repo_url(repo, "/readme");
        tracing::info!(url, "fetch README");
        let response: Option<ReadmeResponse> = self
            .retry
            .run("fetch README", || self.get_once(&url, true))
            .await?;

        let Some(response) = response else {
            tracing::warn!(%repo, "no README found");
            return Ok(None);
        };
        if response.content.is_empty() {
            return Ok(None);
        }
        decode_readme(&response.content).map(Some)
    }

    /// Top-level entries of the default branch
    pub async fn contents(&self, repo: &RepoRef) -> Result<Vec<ContentEntry>> {
        let response: ContentsResponse = self
            .get_json("fetch contents", &self.repo_url(repo, "/contents/"))
            .await?;
        Ok(match response {
            ContentsResponse::Many(entries) => entries,
            ContentsResponse::One(entry) => vec![entry],
        })
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn fetch(&self, repo: &RepoRef) -> Result<RepositorySnapshot> {
        let metadata = self.metadata(repo).await?;
        let (languages, readme, contents) =
            tokio::try_join!(self.languages(repo), self.readme(repo), self.contents(repo))?;

        Ok(RepositorySnapshot {
            repo: repo.clone(),
            metadata,
            languages,
            readme,
            contents,
        })
    }
}

/// Tokens pasted from shells often keep their quotes
fn clean_token(token: &str) -> String {
    token.trim().trim_matches(['"', '\'']).trim().to_string()
}

/// GitHub wraps base64 payloads at 60 columns
fn decode_readme(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| BridgeError::Decode(format!("README is not base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| BridgeError::Decode(format!("README is not UTF-8: {e}")))
}
