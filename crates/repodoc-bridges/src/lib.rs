// SPDX-License-Identifier: AGPL-3.0-or-later
//! Repodoc Bridges - the services a report is built from
//!
//! - [`github`]: repository metadata, languages, README and file list
//! - [`llm`]: analysis text from an OpenAI-compatible chat endpoint
//! - [`analyze`]: fetch, generate and wrap the result for the caller
//!
//! Every HTTP call goes through the shared [`retry::RetryPolicy`].

pub mod analyze;
pub mod github;
pub mod llm;
pub mod retry;

pub use analyze::{analyze, AnalysisEnvelope, RepoSummary};
pub use github::{parse_github_url, GitHubClient, RepoRef, RepositorySnapshot, RepositorySource};
pub use llm::{AnalysisGenerator, LlmClient};
pub use retry::{RetryPolicy, RetrySettings};

/// Error type for upstream services
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Not a valid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("{operation} failed after {attempts} attempts: {last}")]
    UpstreamUnavailable {
        operation: &'static str,
        attempts: u32,
        #[source]
        last: Box<BridgeError>,
    },
}

impl BridgeError {
    /// Whether another attempt might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http { .. })
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BridgeError::Http {
            status: 502,
            body: String::new()
        }
        .is_transient());
        assert!(!BridgeError::InvalidUrl("x".into()).is_transient());
        assert!(!BridgeError::Decode("x".into()).is_transient());
    }

    #[test]
    fn test_upstream_unavailable_message() {
        let err = BridgeError::UpstreamUnavailable {
            operation: "fetch languages",
            attempts: 3,
            last: Box::new(BridgeError::Http {
                status: 503,
                body: "busy".into(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "fetch languages failed after 3 attempts: HTTP error: 503 - busy"
        );
        assert!(!err.is_transient());
    }
}
