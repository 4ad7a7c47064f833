// SPDX-License-Identifier: AGPL-3.0-or-later
//! Locale-aware report styles
//!
//! A [`StyleSet`] is resolved once per render from the locale and handed
//! to the renderer explicitly. Sizes and spacing are shared by all
//! locales; only the fonts change with the script.

use crate::locale::{Locale, Script};
use serde::Serialize;

/// A concrete font the renderer can place text in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
    /// Adobe-GB1 CID font, resolved by the viewer rather than embedded
    StSongLight,
}

impl FontFace {
    /// PostScript name
    pub const fn base_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::Courier => "Courier",
            Self::StSongLight => "STSong-Light",
        }
    }

    pub const fn is_cjk(&self) -> bool {
        matches!(self, Self::StSongLight)
    }
}

/// Faces used for the inline span kinds within one style role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
    pub italic: FontFace,
    pub mono: FontFace,
}

impl FontSet {
    const fn uniform(face: FontFace) -> Self {
        Self {
            regular: face,
            bold: face,
            italic: face,
            mono: face,
        }
    }

    pub fn faces(&self) -> [FontFace; 4] {
        [self.regular, self.bold, self.italic, self.mono]
    }
}

/// Font choice per style role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RoleFonts {
    title: FontSet,
    heading: FontSet,
    body: FontSet,
    code: FontSet,
}

const LATIN_TEXT: FontSet = FontSet {
    regular: FontFace::Helvetica,
    bold: FontFace::HelveticaBold,
    italic: FontFace::HelveticaOblique,
    mono: FontFace::Courier,
};

const LATIN_HEADING: FontSet = FontSet {
    regular: FontFace::HelveticaBold,
    ..LATIN_TEXT
};

static SCRIPT_FONTS: [(Script, RoleFonts); 2] = [
    (
        Script::Latin,
        RoleFonts {
            title: LATIN_HEADING,
            heading: LATIN_HEADING,
            body: LATIN_TEXT,
            code: FontSet::uniform(FontFace::Courier),
        },
    ),
    (
        Script::Cjk,
        RoleFonts {
            title: FontSet::uniform(FontFace::StSongLight),
            heading: FontSet::uniform(FontFace::StSongLight),
            body: FontSet::uniform(FontFace::StSongLight),
            code: FontSet::uniform(FontFace::StSongLight),
        },
    ),
];

/// RGB colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const LIGHT_GREY: Self = Self::rgb(0.827, 0.827, 0.827);
    pub const NAVY: Self = Self::rgb(0.11, 0.17, 0.33);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
}

/// Visual parameters of one paragraph-like flowable, in points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphStyle {
    pub name: &'static str,
    pub fonts: FontSet,
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    /// Indent of every line from the left margin
    pub left_indent: f32,
    /// Extra indent of the first line, relative to `left_indent`
    pub first_line_indent: f32,
    pub alignment: Alignment,
    pub text_color: Color,
    pub back_color: Option<Color>,
}

impl ParagraphStyle {
    fn new(name: &'static str, fonts: FontSet, font_size: f32) -> Self {
        Self {
            name,
            fonts,
            font_size,
            leading: font_size * 1.2,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            first_line_indent: 0.0,
            alignment: Alignment::Left,
            text_color: Color::BLACK,
            back_color: None,
        }
    }
}

/// Gaps the renderer inserts between blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spacing {
    /// After the title block
    pub title_gap: f32,
    /// After headings, paragraphs and list items
    pub block_gap: f32,
    /// Multiplied by `4 - level` before a heading
    pub heading_step: f32,
    /// Added to both list indents per nesting level
    pub list_indent_step: f32,
}

/// Every style the renderer needs for one locale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleSet {
    pub locale: Locale,
    pub title: ParagraphStyle,
    pub headings: [ParagraphStyle; 3],
    pub body: ParagraphStyle,
    pub list: ParagraphStyle,
    pub code: ParagraphStyle,
    pub spacing: Spacing,
}

impl StyleSet {
    /// Build the style set for a locale
    pub fn for_locale(locale: Locale) -> Self {
        let script = locale.script();
        let fonts = SCRIPT_FONTS
            .iter()
            .find(|(s, _)| *s == script)
            .map_or(SCRIPT_FONTS[0].1, |(_, fonts)| *fonts);

        let title = ParagraphStyle {
            space_after: 30.0,
            alignment: Alignment::Center,
            ..ParagraphStyle::new("Title", fonts.title, 24.0)
        };

        let headings = [1u8, 2, 3].map(|level| ParagraphStyle {
            space_before: 20.0,
            space_after: 10.0,
            text_color: Color::NAVY,
            ..ParagraphStyle::new(
                heading_style_name(level),
                fonts.heading,
                20.0 - f32::from(level) * 2.0,
            )
        });

        let body = ParagraphStyle::new("Body", fonts.body, 12.0);

        let list = ParagraphStyle {
            left_indent: 18.0,
            first_line_indent: -18.0,
            ..ParagraphStyle::new("Bullet", fonts.body, 12.0)
        };

        let code = ParagraphStyle {
            space_before: 10.0,
            space_after: 10.0,
            left_indent: 36.0,
            back_color: Some(Color::LIGHT_GREY),
            ..ParagraphStyle::new("Code", fonts.code, 8.0)
        };

        Self {
            locale,
            title,
            headings,
            body,
            list,
            code,
            spacing: Spacing {
                title_gap: 12.0,
                block_gap: 6.0,
                heading_step: 6.0,
                list_indent_step: 18.0,
            },
        }
    }

    /// Heading style; levels outside 1-3 saturate
    pub fn heading(&self, level: u8) -> &ParagraphStyle {
        let index = usize::from(level.clamp(1, 3)) - 1;
        &self.headings[index]
    }

    /// Gap before a heading, larger for higher-ranked headings
    pub fn heading_gap(&self, level: u8) -> f32 {
        f32::from(4 - level.clamp(1, 3)) * self.spacing.heading_step
    }

    /// List style indented for a nesting level
    ///
    /// The bullet sits at `level * step`, wrapped text hangs one step further in.
    pub fn list_item(&self, level: usize) -> ParagraphStyle {
        let shift = level as f32 * self.spacing.list_indent_step;
        ParagraphStyle {
            left_indent: self.list.left_indent + shift,
            ..self.list.clone()
        }
    }

    /// Bullet position of a list item relative to the left margin
    pub fn bullet_indent(&self, level: usize) -> f32 {
        let style = self.list_item(level);
        style.left_indent + style.first_line_indent
    }

    /// Every face any role may draw with
    pub fn faces(&self) -> Vec<FontFace> {
        let mut faces: Vec<FontFace> = std::iter::once(&self.title)
            .chain(&self.headings)
            .chain([&self.body, &self.list, &self.code])
            .flat_map(|style| style.fonts.faces())
            .collect();
        faces.sort();
        faces.dedup();
        faces
    }
}

fn heading_style_name(level: u8) -> &'static str {
    match level {
        1 => "Heading1",
        2 => "Heading2",
        _ => "Heading3",
    }
}

/// Resolve the style set for a locale code; unknown codes get English styles
pub fn resolve(code: &str) -> StyleSet {
    StyleSet::for_locale(Locale::from_code(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_locale_uses_cjk_font_everywhere() {
        let style = resolve("zh");
        assert_eq!(style.faces(), vec![FontFace::StSongLight]);
    }

    #[test]
    fn test_latin_locales_never_use_cjk_font() {
        for code in ["en", "es", "fr", "de"] {
            let style = resolve(code);
            assert!(style.faces().iter().all(|f| !f.is_cjk()), "{code}");
            assert_eq!(style.body.fonts.regular, FontFace::Helvetica);
            assert_eq!(style.code.fonts.regular, FontFace::Courier);
        }
    }

    #[test]
    fn test_unknown_locale_gets_default_styles() {
        assert_eq!(resolve("klingon"), StyleSet::for_locale(Locale::En));
    }

    #[test]
    fn test_heading_sizes_and_gaps() {
        let style = StyleSet::for_locale(Locale::En);
        assert_eq!(style.heading(1).font_size, 18.0);
        assert_eq!(style.heading(2).font_size, 16.0);
        assert_eq!(style.heading(3).font_size, 14.0);
        assert_eq!(style.heading(9).font_size, 14.0);
        assert!(style.heading_gap(1) > style.heading_gap(2));
        assert!(style.heading_gap(2) > style.heading_gap(3));
    }

    #[test]
    fn test_list_indents_scale_linearly() {
        let style = StyleSet::for_locale(Locale::En);
        let step = style.spacing.list_indent_step;
        for level in 0..4 {
            assert_eq!(
                style.list_item(level + 1).left_indent - style.list_item(level).left_indent,
                step
            );
            assert_eq!(style.bullet_indent(level + 1) - style.bullet_indent(level), step);
        }
        assert_eq!(style.bullet_indent(0), 0.0);
    }

    #[test]
    fn test_code_style_is_tinted_and_indented() {
        let style = StyleSet::for_locale(Locale::De);
        assert_eq!(style.code.back_color, Some(Color::LIGHT_GREY));
        assert_eq!(style.code.left_indent, 36.0);
    }
}
