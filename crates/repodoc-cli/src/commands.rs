// SPDX-License-Identifier: AGPL-3.0-or-later
//! `repodoc export` and `repodoc analyze`

use crate::config::AppConfig;
use anyhow::{Context, Result};
use clap::Args;
use repodoc_bridges::{analyze, GitHubClient, LlmClient};
use repodoc_core::{Export, Exporter, Locale, OutputKind};
use std::path::{Path, PathBuf};

/// Arguments for the export command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Markdown analysis to export
    input: PathBuf,

    /// Report locale (en, es, fr, de, zh); unknown codes fall back to en
    #[arg(short, long, default_value = "en")]
    locale: String,

    /// Output kind: markdown | paginated (aliases: md, pdf)
    #[arg(short, long, default_value = "paginated")]
    format: String,

    /// Directory the report is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the markdown JSON envelope instead of writing a file
    #[arg(long)]
    json: bool,
}

impl ExportArgs {
    pub async fn execute(self) -> Result<()> {
        let kind: OutputKind = self.format.parse()?;
        let text = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("failed to read {}", self.input.display()))?;

        let locale = Locale::from_code(&self.locale);
        let export = Exporter::new().export_as(&text, locale, kind)?;

        if self.json {
            if let Some(json) = export.to_json() {
                println!("{}", json?);
                return Ok(());
            }
            tracing::warn!(%kind, "--json only applies to markdown exports");
        }

        let path = write_export(&export, locale, &self.output_dir).await?;
        println!("{}", path.display());
        Ok(())
    }
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// GitHub repository URL
    url: String,

    /// Language of the analysis
    #[arg(short, long, default_value = "en")]
    locale: String,

    /// Also export the analysis in this output kind
    #[arg(short, long)]
    export: Option<String>,

    /// Directory exported reports are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

impl AnalyzeArgs {
    pub async fn execute(self, config: &AppConfig) -> Result<()> {
        let export_kind = self
            .export
            .as_deref()
            .map(str::parse::<OutputKind>)
            .transpose()?;
        let locale = Locale::from_code(&self.locale);

        let github = GitHubClient::with_timeout(
            &config.github_api_url,
            config.github_token.as_deref(),
            config.timeout(),
        )?
        .with_retry(config.retry_policy());
        let llm = LlmClient::with_timeout(&config.llm_api_url, &config.llm_model, config.timeout())?
            .with_retry(config.retry_policy());

        let envelope = analyze(&github, &llm, &self.url, locale)
            .await
            .with_context(|| format!("failed to analyze {}", self.url))?;
        println!("{}", serde_json::to_string_pretty(&envelope)?);

        if let Some(kind) = export_kind {
            let export = Exporter::new().export_as(&envelope.analysis, locale, kind)?;
            let path = write_export(&export, locale, &self.output_dir).await?;
            tracing::info!(path = %path.display(), "wrote report");
        }
        Ok(())
    }
}

/// Write an artifact under its on-disk (not percent-encoded) name
async fn write_export(export: &Export, locale: Locale, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(locale.profile().file_name(export.kind()));
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    tokio::fs::write(&path, export.bytes())
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = export.bytes().len(), "wrote report");
    Ok(path)
}
