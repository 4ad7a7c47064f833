// SPDX-License-Identifier: AGPL-3.0-or-later
//! Repository URL to analysis envelope

use crate::github::{parse_github_url, Languages, RepositorySnapshot, RepositorySource};
use crate::llm::AnalysisGenerator;
use crate::Result;
use repodoc_core::{preview_html, Locale};
use serde::Serialize;

/// Headline numbers shown next to the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub description: String,
    pub languages: Languages,
    pub stars: u64,
    pub forks: u64,
}

impl From<&RepositorySnapshot> for RepoSummary {
    fn from(snapshot: &RepositorySnapshot) -> Self {
        let metadata = &snapshot.metadata;
        Self {
            name: metadata.name.clone(),
            description: metadata.description.clone().unwrap_or_default(),
            languages: snapshot.languages.clone(),
            stars: metadata.stargazers_count,
            forks: metadata.forks_count,
        }
    }
}

/// What an analysis request returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisEnvelope {
    /// Markdown, suitable as input to an export
    pub analysis: String,
    pub analysis_html: String,
    pub language: Locale,
    pub repo_data: RepoSummary,
}

/// Fetch a repository, generate its analysis and wrap both
pub async fn analyze(
    source: &dyn RepositorySource,
    generator: &dyn AnalysisGenerator,
    url: &str,
    locale: Locale,
) -> Result<AnalysisEnvelope> {
    let repo = parse_github_url(url)?;
    tracing::info!(%repo, %locale, "analyzing repository");

    let snapshot = source.fetch(&repo).await?;
    let analysis = generator.generate(&snapshot, locale).await?;

    Ok(AnalysisEnvelope {
        analysis_html: preview_html(&analysis),
        analysis,
        language: locale,
        repo_data: RepoSummary::from(&snapshot),
    })
}
