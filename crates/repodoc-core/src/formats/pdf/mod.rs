// SPDX-License-Identifier: AGPL-3.0-or-later
//! Paginated PDF renderer
//!
//! Rendering happens in three steps: the document becomes a story of
//! flowables, the story is laid out onto pages, and the pages are written
//! out with pdf-writer.

mod fonts;
mod layout;
mod writer;

use crate::ast::{Block, Document, Inline};
use crate::style::{FontSet, StyleSet};
use crate::traits::{ConversionError, OutputKind, PageConfig, Renderer, Result};
use layout::{Flowable, Run};

const TAB_WIDTH: usize = 4;

/// Renders documents to PDF on a fixed page geometry
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    page: PageConfig,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page: PageConfig) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    fn check_geometry(&self) -> Result<()> {
        let page = &self.page;
        let frame_height = page.height - page.margin_top - page.margin_bottom;
        if page.frame_width() <= 0.0 || frame_height <= 0.0 {
            return Err(ConversionError::Render {
                message: format!(
                    "page {}x{}pt leaves no room inside the margins",
                    page.width, page.height
                ),
            });
        }
        Ok(())
    }
}

impl Renderer for PdfRenderer {
    fn kind(&self) -> OutputKind {
        OutputKind::Pdf
    }

    fn render(&self, doc: &Document, style: &StyleSet, title: &str) -> Result<Vec<u8>> {
        self.check_geometry()?;

        let story = build_story(doc, style, title);
        let pages = layout::paginate(&story, &self.page)?;
        tracing::debug!(pages = pages.len(), locale = %style.locale, "laid out report");

        Ok(writer::write_pdf(&pages, &self.page, title))
    }
}

/// Map the document onto flowables, title first
fn build_story(doc: &Document, style: &StyleSet, title: &str) -> Vec<Flowable> {
    let mut story = vec![
        Flowable::Paragraph {
            style: style.title.clone(),
            runs: vec![Run::new(style.title.fonts.regular, title)],
        },
        Flowable::Spacer(style.spacing.title_gap),
    ];

    for block in &doc.blocks {
        match block {
            Block::Heading { level, content } => {
                let heading = style.heading(*level);
                story.push(Flowable::Spacer(style.heading_gap(*level)));
                story.push(Flowable::Paragraph {
                    style: heading.clone(),
                    runs: runs(content, &heading.fonts),
                });
                story.push(Flowable::Spacer(style.spacing.block_gap));
            }
            Block::Paragraph { content } => {
                story.push(Flowable::Paragraph {
                    style: style.body.clone(),
                    runs: runs(content, &style.body.fonts),
                });
                story.push(Flowable::Spacer(style.spacing.block_gap));
            }
            Block::ListItem {
                level,
                bullet,
                content,
            } => {
                let item = style.list_item(*level);
                let mut item_runs = vec![Run::new(item.fonts.regular, format!("{} ", bullet.glyph()))];
                item_runs.extend(runs(content, &item.fonts));
                story.push(Flowable::Paragraph {
                    style: item,
                    runs: item_runs,
                });
                story.push(Flowable::Spacer(style.spacing.block_gap));
            }
            Block::CodeBlock { lines } => {
                story.push(Flowable::Preformatted {
                    style: style.code.clone(),
                    lines: lines.iter().map(|line| expand_tabs(line)).collect(),
                });
            }
        }
    }

    story
}

fn runs(content: &[Inline], fonts: &FontSet) -> Vec<Run> {
    content
        .iter()
        .map(|inline| {
            let face = match inline {
                Inline::Text { .. } => fonts.regular,
                Inline::Strong { .. } => fonts.bold,
                Inline::Emphasis { .. } => fonts.italic,
                Inline::Code { .. } => fonts.mono,
            };
            Run::new(face, inline.text())
        })
        .collect()
}

/// Tabs have no glyph in the base fonts
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}
