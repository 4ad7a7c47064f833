// SPDX-License-Identifier: AGPL-3.0-or-later
//! Report document AST
//!
//! A report is a flat sequence of blocks. Nesting is expressed through
//! `ListItem::level` rather than through child blocks, which keeps the
//! renderer a single pass over the document.

use serde::{Deserialize, Serialize};

/// Deepest heading level a report distinguishes
pub const MAX_HEADING_LEVEL: u8 = 3;

/// The root document node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Count words in the document
    pub fn word_count(&self) -> usize {
        self.blocks.iter().map(|b| b.word_count()).sum()
    }

    /// Count characters in the document
    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(|b| b.char_count()).sum()
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

/// Block-level elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Heading with level 1-3
    Heading { level: u8, content: Vec<Inline> },

    /// Plain paragraph, source lines joined with single spaces
    Paragraph { content: Vec<Inline> },

    /// One list entry; nesting comes from `level`
    ListItem {
        level: usize,
        bullet: Bullet,
        content: Vec<Inline>,
    },

    /// Fenced code, lines kept verbatim
    CodeBlock { lines: Vec<String> },
}

impl Block {
    /// Build a heading, saturating the level into `1..=3`
    pub fn heading(level: usize, content: Vec<Inline>) -> Self {
        let level = level.clamp(1, MAX_HEADING_LEVEL as usize) as u8;
        Block::Heading { level, content }
    }

    /// Inline content of the block, `None` for code blocks
    pub fn inlines(&self) -> Option<&[Inline]> {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph { content }
            | Block::ListItem { content, .. } => Some(content),
            Block::CodeBlock { .. } => None,
        }
    }

    /// Text of the block with inline markup removed
    pub fn plain_text(&self) -> String {
        match self {
            Block::CodeBlock { lines } => lines.join("\n"),
            _ => self
                .inlines()
                .map(|inlines| inlines.iter().map(Inline::text).collect())
                .unwrap_or_default(),
        }
    }

    /// Count words in this block
    pub fn word_count(&self) -> usize {
        match self {
            Block::CodeBlock { lines } => lines.iter().map(|l| l.split_whitespace().count()).sum(),
            _ => self
                .inlines()
                .map_or(0, |inlines| inlines.iter().map(|i| i.word_count()).sum()),
        }
    }

    /// Count characters in this block
    pub fn char_count(&self) -> usize {
        match self {
            Block::CodeBlock { lines } => lines.iter().map(|l| l.chars().count()).sum(),
            _ => self
                .inlines()
                .map_or(0, |inlines| inlines.iter().map(|i| i.char_count()).sum()),
        }
    }
}

/// Bullet glyph shown in front of a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bullet {
    /// Generic round bullet; `-`, `*` and `1.` markers all normalise to it
    Disc,
    /// A literal `+` marker, kept as written
    Plus,
}

impl Bullet {
    pub const fn glyph(&self) -> char {
        match self {
            Self::Disc => '\u{2022}',
            Self::Plus => '+',
        }
    }
}

/// Inline elements (character-level)
///
/// Span contents are plain strings: a resolved span is never scanned again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text
    Text { content: String },

    /// Strong emphasis (usually bold)
    Strong { content: String },

    /// Emphasis (usually italic)
    Emphasis { content: String },

    /// Inline code
    Code { content: String },
}

impl Inline {
    pub fn text_run(content: impl Into<String>) -> Self {
        Inline::Text {
            content: content.into(),
        }
    }

    /// Raw text of the span
    pub fn text(&self) -> &str {
        match self {
            Inline::Text { content }
            | Inline::Strong { content }
            | Inline::Emphasis { content }
            | Inline::Code { content } => content,
        }
    }

    /// Count words in this inline element
    pub fn word_count(&self) -> usize {
        self.text().split_whitespace().count()
    }

    /// Count characters in this inline element
    pub fn char_count(&self) -> usize {
        self.text().chars().count()
    }
}
