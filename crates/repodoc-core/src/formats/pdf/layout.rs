// SPDX-License-Identifier: AGPL-3.0-or-later
//! Line breaking and pagination
//!
//! A story is a list of flowables laid out top to bottom in the page frame.
//! Paragraph text is broken greedily at Unicode word boundaries and lines
//! flow onto new pages one at a time.

use crate::style::{Alignment, Color, FontFace, ParagraphStyle};
use crate::traits::{ConversionError, PageConfig, Result};
use unicode_segmentation::UnicodeSegmentation;

/// Text width kept free however deep a paragraph is indented
const MIN_TEXT_WIDTH: f32 = 72.0;

/// A run of text in a single face
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Run {
    pub face: FontFace,
    pub text: String,
}

impl Run {
    pub fn new(face: FontFace, text: impl Into<String>) -> Self {
        Self {
            face,
            text: text.into(),
        }
    }
}

/// One element of the story
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flowable {
    /// Wrapped text
    Paragraph { style: ParagraphStyle, runs: Vec<Run> },
    /// Text with hard line breaks and whitespace kept
    Preformatted {
        style: ParagraphStyle,
        lines: Vec<String>,
    },
    /// Vertical gap
    Spacer(f32),
}

/// Something to paint on a page, in PDF user space (origin bottom left)
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
        color: Color,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PageLayout {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    face: FontFace,
    text: String,
    width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Line {
    segments: Vec<Segment>,
    width: f32,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(&mut self, face: FontFace, text: &str, width: f32) {
        self.width += width;
        match self.segments.last_mut() {
            Some(last) if last.face == face => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.segments.push(Segment {
                face,
                text: text.to_string(),
                width,
            }),
        }
    }

    /// Drop trailing whitespace so centred lines balance
    fn trim_end(&mut self, size: f32) {
        while let Some(last) = self.segments.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            if trimmed_len == last.text.len() {
                break;
            }
            last.text.truncate(trimmed_len);
            let width = last.face.text_width(&last.text, size);
            self.width -= last.width - width;
            last.width = width;
            if last.text.is_empty() {
                self.segments.pop();
            }
        }
    }
}

/// Break runs into lines no wider than `first_width` (first line) or
/// `width` (the rest). Always returns at least one line.
fn break_lines(
    runs: &[Run],
    size: f32,
    first_width: f32,
    width: f32,
    keep_spaces: bool,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();
    let mut limit = first_width;

    let wrap = |current: &mut Line, lines: &mut Vec<Line>, limit: &mut f32| {
        let mut done = std::mem::take(current);
        if !keep_spaces {
            done.trim_end(size);
        }
        lines.push(done);
        *limit = width;
    };

    for run in runs {
        for token in run.text.split_word_bounds() {
            let is_space = token.chars().all(char::is_whitespace);
            if is_space && current.is_empty() && !keep_spaces {
                continue;
            }

            let token_width = run.face.text_width(token, size);
            if current.width + token_width <= limit {
                current.push(run.face, token, token_width);
                continue;
            }

            if !current.is_empty() {
                wrap(&mut current, &mut lines, &mut limit);
                if is_space && !keep_spaces {
                    continue;
                }
            }

            if token_width <= limit {
                current.push(run.face, token, token_width);
                continue;
            }

            // Wider than a whole line: split between characters.
            for (start, ch) in token.char_indices() {
                let piece = &token[start..start + ch.len_utf8()];
                let piece_width = run.face.text_width(piece, size);
                if current.width + piece_width > limit && !current.is_empty() {
                    wrap(&mut current, &mut lines, &mut limit);
                }
                current.push(run.face, piece, piece_width);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        if !keep_spaces {
            current.trim_end(size);
        }
        lines.push(current);
    }
    lines
}

/// Vertical cursor over the page frames
struct Cursor<'a> {
    config: &'a PageConfig,
    pages: Vec<PageLayout>,
    /// Top of the free space on the current page
    y: f32,
    at_top: bool,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: vec![PageLayout::default()],
            y: config.height - config.margin_top,
            at_top: true,
        }
    }

    fn bottom(&self) -> f32 {
        self.config.margin_bottom
    }

    fn frame_height(&self) -> f32 {
        self.config.height - self.config.margin_top - self.config.margin_bottom
    }

    /// Indent capped so that `MIN_TEXT_WIDTH` stays inside the frame
    fn clamp_indent(&self, indent: f32) -> f32 {
        indent
            .min(self.config.frame_width() - MIN_TEXT_WIDTH)
            .max(0.0)
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.y = self.config.height - self.config.margin_top;
        self.at_top = true;
    }

    /// Vertical gap; swallowed at the top of a page and at a page break
    fn space(&mut self, height: f32) {
        if self.at_top || height <= 0.0 {
            return;
        }
        if self.y - height < self.bottom() {
            self.new_page();
        } else {
            self.y -= height;
        }
    }

    /// Claim a band of `height`; returns its top edge
    fn band(&mut self, height: f32) -> Result<f32> {
        if height > self.frame_height() {
            return Err(ConversionError::Render {
                message: format!(
                    "line height {height}pt exceeds the {}pt page frame",
                    self.frame_height()
                ),
            });
        }
        if self.y - height < self.bottom() {
            self.new_page();
        }
        let top = self.y;
        self.y -= height;
        self.at_top = false;
        Ok(top)
    }

    fn draw(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn emit_line(&mut self, style: &ParagraphStyle, line: &Line, indent: f32) -> Result<()> {
        let top = self.band(style.leading)?;
        let left = self.config.margin_left + indent;
        let available = self.config.frame_width() - indent;

        if let Some(color) = style.back_color {
            self.draw(DrawOp::Rect {
                x: left,
                y: top - style.leading,
                width: available,
                height: style.leading,
                color,
            });
        }

        let mut x = match style.alignment {
            Alignment::Left => left,
            Alignment::Center => left + (available - line.width).max(0.0) / 2.0,
        };
        let baseline = top - style.font_size;

        for segment in &line.segments {
            self.draw(DrawOp::Text {
                x,
                y: baseline,
                face: segment.face,
                size: style.font_size,
                color: style.text_color,
                text: segment.text.clone(),
            });
            x += segment.width;
        }
        Ok(())
    }

    fn paragraph(&mut self, style: &ParagraphStyle, runs: &[Run]) -> Result<()> {
        let frame = self.config.frame_width();
        let left_indent = self.clamp_indent(style.left_indent);
        let first_indent = self.clamp_indent(left_indent + style.first_line_indent);
        let lines = break_lines(
            runs,
            style.font_size,
            frame - first_indent,
            frame - left_indent,
            false,
        );

        self.space(style.space_before);
        for (index, line) in lines.iter().enumerate() {
            let indent = if index == 0 { first_indent } else { left_indent };
            self.emit_line(style, line, indent)?;
        }
        self.space(style.space_after);
        Ok(())
    }

    fn preformatted(&mut self, style: &ParagraphStyle, lines: &[String]) -> Result<()> {
        let indent = self.clamp_indent(style.left_indent);
        let width = self.config.frame_width() - indent;

        self.space(style.space_before);
        for source in lines {
            let runs = [Run::new(style.fonts.regular, source.as_str())];
            for line in break_lines(&runs, style.font_size, width, width, true) {
                self.emit_line(style, &line, indent)?;
            }
        }
        self.space(style.space_after);
        Ok(())
    }
}

/// Lay the story out onto pages
pub(crate) fn paginate(story: &[Flowable], config: &PageConfig) -> Result<Vec<PageLayout>> {
    let mut cursor = Cursor::new(config);

    for flowable in story {
        match flowable {
            Flowable::Paragraph { style, runs } => cursor.paragraph(style, runs)?,
            Flowable::Preformatted { style, lines } => cursor.preformatted(style, lines)?,
            Flowable::Spacer(height) => cursor.space(*height),
        }
    }

    Ok(cursor.pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::style::StyleSet;

    fn body() -> ParagraphStyle {
        StyleSet::for_locale(Locale::En).body
    }

    fn text_ops(page: &PageLayout) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rect { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_break_lines_respects_width() {
        let runs = [Run::new(FontFace::Courier, "aaaa bbbb cccc")];
        // Courier at 10pt: 6pt per character, so 60pt holds 10 characters
        let lines = break_lines(&runs, 10.0, 60.0, 60.0, false);
        let texts: Vec<String> = lines
            .iter()
            .map(|l| l.segments.iter().map(|s| s.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec!["aaaa bbbb", "cccc"]);
        assert!(lines.iter().all(|l| l.width <= 60.0));
    }

    #[test]
    fn test_break_lines_splits_long_words() {
        let runs = [Run::new(FontFace::Courier, "abcdefghij")];
        // three characters per line
        let lines = break_lines(&runs, 10.0, 18.0, 18.0, false);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_break_lines_wraps_cjk_per_ideograph() {
        let runs = [Run::new(FontFace::StSongLight, "代码仓库分析")];
        let lines = break_lines(&runs, 10.0, 20.0, 20.0, false);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_break_lines_keeps_leading_spaces_for_code() {
        let runs = [Run::new(FontFace::Courier, "    indented")];
        let lines = break_lines(&runs, 10.0, 400.0, 400.0, true);
        assert_eq!(lines[0].segments[0].text, "    indented");
    }

    #[test]
    fn test_empty_input_gives_one_empty_line() {
        let lines = break_lines(&[], 10.0, 100.0, 100.0, true);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_empty());
    }

    #[test]
    fn test_segments_switch_face() {
        let runs = [
            Run::new(FontFace::Helvetica, "plain "),
            Run::new(FontFace::HelveticaBold, "bold"),
        ];
        let lines = break_lines(&runs, 12.0, 400.0, 400.0, false);
        assert_eq!(lines[0].segments.len(), 2);
        assert_eq!(lines[0].segments[1].face, FontFace::HelveticaBold);
    }

    #[test]
    fn test_long_story_spills_onto_more_pages() {
        let story: Vec<Flowable> = (0..80)
            .map(|i| Flowable::Paragraph {
                style: body(),
                runs: vec![Run::new(FontFace::Helvetica, format!("paragraph {i}"))],
            })
            .collect();
        let pages = paginate(&story, &PageConfig::letter()).unwrap();
        assert!(pages.len() > 1);
        let total: usize = pages.iter().map(|p| text_ops(p).len()).sum();
        assert_eq!(total, 80);
    }

    #[test]
    fn test_text_stays_inside_margins() {
        let config = PageConfig::letter();
        let story = vec![Flowable::Paragraph {
            style: body(),
            runs: vec![Run::new(FontFace::Helvetica, "word ".repeat(2000))],
        }];
        for page in paginate(&story, &config).unwrap() {
            for op in &page.ops {
                if let DrawOp::Text { y, x, .. } = op {
                    assert!(*y >= config.margin_bottom - 1.0);
                    assert!(*y <= config.height - config.margin_top);
                    assert!(*x >= config.margin_left);
                }
            }
        }
    }

    #[test]
    fn test_deep_list_nesting_keeps_text_on_the_page() {
        let config = PageConfig::letter();
        let style = StyleSet::for_locale(Locale::En);
        let story = vec![Flowable::Paragraph {
            style: style.list_item(30),
            runs: vec![
                Run::new(FontFace::Helvetica, "\u{2022} "),
                Run::new(FontFace::Helvetica, "deeply nested item"),
            ],
        }];
        let pages = paginate(&story, &config).unwrap();
        for op in &pages[0].ops {
            if let DrawOp::Text { x, .. } = op {
                assert!(*x >= config.margin_left);
                assert!(*x < config.width - config.margin_right);
            }
        }
        assert!(text_ops(&pages[0]).iter().any(|text| text.contains("nested")));
    }

    #[test]
    fn test_spacer_at_page_top_is_swallowed() {
        let config = PageConfig::letter();
        let story = vec![
            Flowable::Spacer(100.0),
            Flowable::Paragraph {
                style: body(),
                runs: vec![Run::new(FontFace::Helvetica, "first")],
            },
        ];
        let pages = paginate(&story, &config).unwrap();
        let DrawOp::Text { y, .. } = &pages[0].ops[0] else {
            panic!("expected text");
        };
        assert_eq!(*y, config.height - config.margin_top - body().font_size);
    }

    #[test]
    fn test_background_painted_behind_code_lines() {
        let code = StyleSet::for_locale(Locale::En).code;
        let story = vec![Flowable::Preformatted {
            style: code,
            lines: vec!["a".to_string(), String::new(), "b".to_string()],
        }];
        let pages = paginate(&story, &PageConfig::letter()).unwrap();
        let rects = pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count();
        assert_eq!(rects, 3);
    }

    #[test]
    fn test_oversized_line_is_a_render_error() {
        let config = PageConfig {
            height: 100.0,
            margin_top: 45.0,
            margin_bottom: 45.0,
            ..PageConfig::letter()
        };
        let story = vec![Flowable::Paragraph {
            style: body(),
            runs: vec![Run::new(FontFace::Helvetica, "too tall")],
        }];
        let err = paginate(&story, &config).unwrap_err();
        assert!(matches!(err, ConversionError::Render { .. }));
    }
}
