// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTML preview of report markdown using comrak
//!
//! The preview is what the browser shows next to the raw analysis; it goes
//! through comrak (GFM) rather than the block parser, so tables and links
//! that the PDF path flattens still show up.

use comrak::{markdown_to_html, Options};

fn comrak_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options
}

/// Render report markdown to an HTML fragment
pub fn preview_html(markdown: &str) -> String {
    markdown_to_html(markdown, &comrak_options())
}
