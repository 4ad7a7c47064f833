// SPDX-License-Identifier: AGPL-3.0-or-later
//! Line-oriented Markdown block parser
//!
//! Handles the subset of Markdown that analysis reports use: ATX and
//! underline headings, flat or indented list items, fenced code and
//! paragraphs. Anything else is paragraph text.

use crate::ast::{Block, Bullet, Document};
use crate::formats::inline::format_inline;
use crate::traits::Parser;

const FENCE: &str = "```";

/// Markdown report parser
#[derive(Debug, Clone, Copy)]
pub struct MarkdownHandler;

impl MarkdownHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarkdownHandler {
    fn parse(&self, input: &str) -> Document {
        let doc = BlockParser::new(input).run();
        tracing::debug!(
            blocks = doc.blocks.len(),
            words = doc.word_count(),
            "parsed markdown report"
        );
        doc
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InCodeBlock,
}

struct BlockParser<'a> {
    lines: Vec<&'a str>,
    state: State,
    pending_paragraph: Vec<&'a str>,
    code_buffer: Vec<String>,
    doc: Document,
}

impl<'a> BlockParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().collect(),
            state: State::Normal,
            pending_paragraph: Vec::new(),
            code_buffer: Vec::new(),
            doc: Document::new(),
        }
    }

    fn run(mut self) -> Document {
        let mut index = 0;
        while index < self.lines.len() {
            index += self.step(index);
        }
        self.finish()
    }

    /// Consume the line at `index`; returns how many lines were used
    fn step(&mut self, index: usize) -> usize {
        let line = self.lines[index];
        match self.state {
            State::InCodeBlock => {
                if is_fence(line) {
                    let lines = std::mem::take(&mut self.code_buffer);
                    self.doc.push(Block::CodeBlock { lines });
                    self.state = State::Normal;
                } else {
                    self.code_buffer.push(line.to_string());
                }
                1
            }
            State::Normal => self.step_normal(index, line),
        }
    }

    fn step_normal(&mut self, index: usize, line: &'a str) -> usize {
        let trimmed = line.trim();

        if is_fence(line) {
            self.flush_paragraph();
            self.code_buffer.clear();
            self.state = State::InCodeBlock;
            return 1;
        }

        if trimmed.is_empty() {
            self.flush_paragraph();
            return 1;
        }

        if let Some((level, text)) = atx_heading(trimmed) {
            self.flush_paragraph();
            self.doc.push(Block::heading(level, format_inline(text)));
            return 1;
        }

        if let Some((level, bullet, text)) = list_item(line) {
            self.flush_paragraph();
            self.doc.push(Block::ListItem {
                level,
                bullet,
                content: format_inline(text),
            });
            return 1;
        }

        let underline = self
            .lines
            .get(index + 1)
            .and_then(|next| underline_level(next));
        if let Some(level) = underline {
            self.flush_paragraph();
            self.doc.push(Block::heading(level, format_inline(trimmed)));
            return 2;
        }

        self.pending_paragraph.push(trimmed);
        1
    }

    fn flush_paragraph(&mut self) {
        if self.pending_paragraph.is_empty() {
            return;
        }
        let text = self.pending_paragraph.join(" ");
        self.pending_paragraph.clear();
        self.doc.push(Block::Paragraph {
            content: format_inline(&text),
        });
    }

    fn finish(mut self) -> Document {
        if self.state == State::InCodeBlock {
            // Unterminated fences are dropped, not emitted.
            tracing::warn!(
                lines = self.code_buffer.len(),
                "discarding unterminated code fence"
            );
        }
        self.flush_paragraph();
        self.doc
    }
}

fn is_fence(line: &str) -> bool {
    line.trim().starts_with(FENCE)
}

/// `### Title` -> (3, "Title"); level is the raw `#` count
fn atx_heading(trimmed: &str) -> Option<(usize, &str)> {
    let text = trimmed.trim_start_matches('#');
    let level = trimmed.len() - text.len();
    (level > 0).then(|| (level, text.trim()))
}

/// Recognise `+ `, `- `, `* ` and `1. `..`9. ` after the indentation
fn list_item(line: &str) -> Option<(usize, Bullet, &str)> {
    let body = line.trim_start();
    let indent = line.chars().count() - body.chars().count();

    let (bullet, text) = if let Some(rest) = body.strip_prefix("+ ") {
        (Bullet::Plus, rest)
    } else if let Some(rest) = body.strip_prefix("- ").or_else(|| body.strip_prefix("* ")) {
        (Bullet::Disc, rest)
    } else {
        let rest = body.strip_prefix(|c: char| matches!(c, '1'..='9'))?;
        (Bullet::Disc, rest.strip_prefix(". ")?)
    };

    Some((indent / 2, bullet, text.trim()))
}

/// A line made only of `=` (level 1) or only of `-` (level 2)
fn underline_level(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}
