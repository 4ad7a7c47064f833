// SPDX-License-Identifier: AGPL-3.0-or-later
//! Parser and Renderer traits for report formats

use crate::ast::Document;
use crate::style::StyleSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Error type for exporting and rendering
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Analysis content is required")]
    MissingContent,

    #[error("Unsupported format: {requested}")]
    UnsupportedOutput { requested: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ConversionError {
    /// Whether the caller sent something we refuse before doing any work
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingContent | Self::UnsupportedOutput { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Kind of artifact an export produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// The analysis text, unchanged
    Markdown,
    /// A laid-out, paginated PDF
    Pdf,
}

impl OutputKind {
    /// File extension for this kind
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Pdf => "pdf",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }

    pub const ALL: [Self; 2] = [Self::Markdown, Self::Pdf];
}

impl FromStr for OutputKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "paginated" | "pdf" => Ok(Self::Pdf),
            _ => Err(ConversionError::UnsupportedOutput {
                requested: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => f.write_str("markdown"),
            Self::Pdf => f.write_str("pdf"),
        }
    }
}

/// Page geometry for paginated output, in PDF points
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Written to the document info dictionary
    pub producer: String,
}

impl PageConfig {
    /// US Letter with one-inch margins
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
            producer: concat!("repodoc ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Width available to text between the side margins
    pub fn frame_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::letter()
    }
}

/// Parser trait: convert report text to the AST
///
/// Parsing never fails; malformed markup degrades to literal text.
pub trait Parser: Send + Sync {
    fn parse(&self, input: &str) -> Document;
}

/// Renderer trait: lay a document out into a binary artifact
pub trait Renderer: Send + Sync {
    /// The artifact kind this renderer produces
    fn kind(&self) -> OutputKind;

    /// Render a Document, headed by `title`, using `style`
    fn render(&self, doc: &Document, style: &StyleSet, title: &str) -> Result<Vec<u8>>;
}

/// Extension trait for writer output (not dyn-compatible)
pub trait RendererExt: Renderer {
    fn render_writer<W: Write>(
        &self,
        doc: &Document,
        style: &StyleSet,
        title: &str,
        writer: &mut W,
    ) -> Result<()> {
        let output = self.render(doc, style, title)?;
        writer.write_all(&output)?;
        Ok(())
    }
}

impl<T: Renderer> RendererExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_aliases() {
        assert_eq!("markdown".parse::<OutputKind>().unwrap(), OutputKind::Markdown);
        assert_eq!("md".parse::<OutputKind>().unwrap(), OutputKind::Markdown);
        assert_eq!("paginated".parse::<OutputKind>().unwrap(), OutputKind::Pdf);
        assert_eq!(" PDF ".parse::<OutputKind>().unwrap(), OutputKind::Pdf);
    }

    #[test]
    fn test_output_kind_rejects_unknown() {
        let err = "docx".parse::<OutputKind>().unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "Unsupported format: docx");
    }

    #[test]
    fn test_letter_frame_width() {
        assert_eq!(PageConfig::letter().frame_width(), 468.0);
    }
}
