// SPDX-License-Identifier: AGPL-3.0-or-later
//! Repodoc Core - Report parsing, styling and export
//!
//! This crate provides:
//! - A small block AST for analysis reports
//! - A Markdown block parser and inline formatter
//! - Locale profiles and locale-aware style sets
//! - A paginated PDF renderer and an HTML preview
//! - The top-level export operation

pub mod ast;
pub mod export;
pub mod formats;
pub mod locale;
pub mod style;
pub mod traits;

pub use ast::{Block, Bullet, Document, Inline};
pub use export::{export, Export, Exporter, MarkdownExport, PaginatedExport};
pub use formats::{preview_html, MarkdownHandler, PdfRenderer};
pub use locale::{resolve_profile, Locale, LocaleProfile};
pub use style::StyleSet;
pub use traits::{ConversionError, OutputKind, PageConfig, Parser, Renderer, Result};
