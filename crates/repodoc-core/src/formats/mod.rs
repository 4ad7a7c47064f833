// SPDX-License-Identifier: AGPL-3.0-or-later
//! Format handlers: Markdown in, PDF or HTML out

pub mod html;
pub mod inline;
pub mod markdown;
pub mod pdf;

pub use html::preview_html;
pub use inline::format_inline;
pub use markdown::MarkdownHandler;
pub use pdf::PdfRenderer;
