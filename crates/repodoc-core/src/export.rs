// SPDX-License-Identifier: AGPL-3.0-or-later
//! Report export: analysis text plus locale to a downloadable artifact

use crate::formats::{MarkdownHandler, PdfRenderer};
use crate::locale::Locale;
use crate::style::StyleSet;
use crate::traits::{ConversionError, OutputKind, PageConfig, Parser, Renderer, Result};
use serde::Serialize;

/// The analysis text handed back unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownExport {
    pub content: String,
    pub format: &'static str,
    /// Percent-encoded when the locale's file name is not ASCII
    pub filename: String,
}

/// A rendered PDF ready to stream to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedExport {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    /// Percent-encoded when the locale's file name is not ASCII
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Export {
    Markdown(MarkdownExport),
    Paginated(PaginatedExport),
}

impl Export {
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Markdown(_) => OutputKind::Markdown,
            Self::Paginated(_) => OutputKind::Pdf,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Self::Markdown(export) => &export.filename,
            Self::Paginated(export) => &export.filename,
        }
    }

    /// Artifact body as written to disk or the wire
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Markdown(export) => export.content.as_bytes(),
            Self::Paginated(export) => &export.bytes,
        }
    }

    /// JSON envelope of a markdown export, `None` for binary artifacts
    pub fn to_json(&self) -> Option<Result<String>> {
        match self {
            Self::Markdown(export) => Some(
                serde_json::to_string_pretty(export)
                    .map_err(|e| ConversionError::SerializationError(e.to_string())),
            ),
            Self::Paginated(_) => None,
        }
    }
}

/// Parses the analysis and renders it in the requested output kind
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    parser: MarkdownHandler,
    pdf: PdfRenderer,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page: PageConfig) -> Self {
        Self {
            parser: MarkdownHandler::new(),
            pdf: PdfRenderer::with_page(page),
        }
    }

    /// Export `text` for a locale code and an output kind name
    ///
    /// The output kind is checked before the text is looked at.
    pub fn export(&self, text: &str, locale: &str, output: &str) -> Result<Export> {
        let kind: OutputKind = output.parse()?;
        self.export_as(text, Locale::from_code(locale), kind)
    }

    pub fn export_as(&self, text: &str, locale: Locale, kind: OutputKind) -> Result<Export> {
        if text.is_empty() {
            return Err(ConversionError::MissingContent);
        }

        let profile = locale.profile();
        tracing::info!(%locale, %kind, bytes = text.len(), "exporting report");

        match kind {
            OutputKind::Markdown => Ok(Export::Markdown(MarkdownExport {
                content: text.to_string(),
                format: kind.extension(),
                filename: profile.transport_file_name(kind),
            })),
            OutputKind::Pdf => {
                let doc = self.parser.parse(text);
                tracing::debug!(
                    blocks = doc.blocks.len(),
                    words = doc.word_count(),
                    chars = doc.char_count(),
                    "document statistics"
                );
                let style = StyleSet::for_locale(locale);
                let bytes = self.pdf.render(&doc, &style, profile.display_title)?;
                Ok(Export::Paginated(PaginatedExport {
                    bytes,
                    mime_type: kind.mime_type(),
                    filename: profile.transport_file_name(kind),
                }))
            }
        }
    }
}

/// Export with the default page geometry
pub fn export(text: &str, locale: &str, output: &str) -> Result<Export> {
    Exporter::new().export(text, locale, output)
}
