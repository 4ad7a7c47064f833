// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline emphasis resolution
//!
//! Turns `` `code` ``, `**bold**` and `*italic*` spans of a single text run
//! into [`Inline`] nodes. Each pass only looks at the plain text left over
//! by the previous passes, so a resolved span is never rescanned. Code
//! spans are cut out first, which keeps emphasis markers inside them
//! literal. Unmatched delimiters stay in the text as written.

use crate::ast::Inline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Code,
    Strong,
    Emphasis,
}

impl SpanKind {
    const fn delimiter(self) -> &'static str {
        match self {
            Self::Code => "`",
            Self::Strong => "**",
            Self::Emphasis => "*",
        }
    }

    fn wrap(self, content: &str) -> Inline {
        let content = content.to_string();
        match self {
            Self::Code => Inline::Code { content },
            Self::Strong => Inline::Strong { content },
            Self::Emphasis => Inline::Emphasis { content },
        }
    }
}

/// Code spans go first so emphasis markers inside backticks stay literal.
/// `**` has to be consumed before `*`, otherwise bold reads as two italics.
const PASSES: [SpanKind; 3] = [SpanKind::Code, SpanKind::Strong, SpanKind::Emphasis];

/// Resolve inline markup in one run of text
pub fn format_inline(text: &str) -> Vec<Inline> {
    let mut spans = vec![Inline::text_run(text)];

    for kind in PASSES {
        spans = spans
            .into_iter()
            .flat_map(|span| match span {
                Inline::Text { content } => split_spans(&content, kind),
                resolved => vec![resolved],
            })
            .collect();
    }

    spans
}

/// Split one plain run on the shortest `delim ... delim` pairs
fn split_spans(text: &str, kind: SpanKind) -> Vec<Inline> {
    let delim = kind.delimiter();
    let mut out = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(open) = rest.find(delim) {
        let inner = &rest[open + delim.len()..];
        match inner.find(delim) {
            None => break,
            // `****` or ``` `` ```: nothing to wrap, keep the opener literal
            Some(0) => {
                literal.push_str(&rest[..open + delim.len()]);
                rest = inner;
            }
            Some(close) => {
                literal.push_str(&rest[..open]);
                if !literal.is_empty() {
                    out.push(Inline::text_run(std::mem::take(&mut literal)));
                }
                out.push(kind.wrap(&inner[..close]));
                rest = &inner[close + delim.len()..];
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        out.push(Inline::text_run(literal));
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Property: the formatter accepts any input and loses no characters
        // other than the delimiters it consumed
        #[test]
        fn prop_formatter_is_total(input in "[a-z *`]{0,40}") {
            let spans = format_inline(&input);
            let kept: usize = spans.iter().map(|s| s.char_count()).sum();
            prop_assert!(kept <= input.chars().count());
        }

        // Property: text without delimiters is a single untouched run
        #[test]
        fn prop_plain_text_untouched(input in "[a-zA-Z0-9 .,]{1,40}") {
            prop_assert_eq!(format_inline(&input), vec![Inline::text_run(input.clone())]);
        }
    }
}
