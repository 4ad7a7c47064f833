// SPDX-License-Identifier: AGPL-3.0-or-later
//! Font metrics, text encoding and font dictionaries
//!
//! Western faces are the non-embedded base-14 fonts with WinAnsiEncoding.
//! The CJK face is `STSong-Light` addressed through the predefined
//! `UniGB-UCS2-H` CMap, so every character is written as one UCS-2 code unit.

use crate::style::FontFace;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo};
use pdf_writer::{Finish, Name, Pdf, Rect, Ref, Str};

/// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space-/
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0-?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @-O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P-_
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `-o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p-~
];

/// Helvetica-Bold advance widths for U+0020..=U+007E
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space-/
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0-?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @-O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P-_
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `-o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p-~
];

const COURIER_WIDTH: u16 = 600;
const CJK_HALF_WIDTH: u16 = 500;
const CJK_FULL_WIDTH: u16 = 1000;
const FALLBACK_WIDTH: u16 = 556;

/// WinAnsiEncoding bytes 0x80..=0x9F that differ from Latin-1
const WIN_ANSI_EXTRAS: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

impl FontFace {
    /// Name of the font in page resource dictionaries
    pub(crate) const fn resource_name(&self) -> &'static [u8] {
        match self {
            Self::Helvetica => b"Helv",
            Self::HelveticaBold => b"HelvB",
            Self::HelveticaOblique => b"HelvI",
            Self::Courier => b"Cour",
            Self::StSongLight => b"Song",
        }
    }

    /// Advance width of one character, in 1/1000 em
    fn char_width(&self, ch: char) -> u16 {
        match self {
            Self::Courier => COURIER_WIDTH,
            Self::StSongLight if ch.is_ascii_graphic() || ch == ' ' => CJK_HALF_WIDTH,
            Self::StSongLight => CJK_FULL_WIDTH,
            Self::Helvetica | Self::HelveticaOblique => latin_width(&HELVETICA_WIDTHS, ch),
            Self::HelveticaBold => latin_width(&HELVETICA_BOLD_WIDTHS, ch),
        }
    }

    /// Width of `text` set at `size` points
    pub(crate) fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| u32::from(self.char_width(ch))).sum();
        units as f32 * size / 1000.0
    }

    /// Encode `text` for a `Tj` operator; unencodable characters become `?`
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        if self.is_cjk() {
            text.chars()
                .flat_map(|ch| {
                    let unit = u16::try_from(u32::from(ch)).unwrap_or(u16::from(b'?'));
                    unit.to_be_bytes()
                })
                .collect()
        } else {
            text.chars().map(win_ansi_byte).collect()
        }
    }
}

fn latin_width(table: &[u16; 95], ch: char) -> u16 {
    match ch {
        ' '..='~' => table[ch as usize - 0x20],
        '•' => 350,
        'ß' => 611,
        _ => match fold_accent(ch) {
            Some(base) => table[base as usize - 0x20],
            None => FALLBACK_WIDTH,
        },
    }
}

/// Base letter of the accented Latin-1 letters used by es/fr/de text
fn fold_accent(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

fn win_ansi_byte(ch: char) -> u8 {
    match u32::from(ch) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(c, _)| *c == ch)
            .map_or(b'?', |(_, byte)| *byte),
    }
}

/// Write the font dictionary for `face` under `id`
///
/// The CJK face needs two more objects, which are taken from `alloc`.
pub(crate) fn write_font(pdf: &mut Pdf, face: FontFace, id: Ref, alloc: &mut Ref) {
    let base_name = Name(face.base_name().as_bytes());

    if !face.is_cjk() {
        pdf.type1_font(id)
            .base_font(base_name)
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        return;
    }

    let cid_id = alloc.bump();
    let descriptor_id = alloc.bump();

    pdf.type0_font(id)
        .base_font(Name(b"STSong-Light-UniGB-UCS2-H"))
        .encoding_predefined(Name(b"UniGB-UCS2-H"))
        .descendant_font(cid_id);

    let mut cid = pdf.cid_font(cid_id);
    cid.subtype(CidFontType::Type0);
    cid.base_font(base_name);
    cid.system_info(SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"GB1"),
        supplement: 2,
    });
    cid.font_descriptor(descriptor_id);
    cid.default_width(f32::from(CJK_FULL_WIDTH));
    // CIDs 1-95 are the proportional ASCII glyphs of Adobe-GB1.
    cid.widths().same(1, 95, f32::from(CJK_HALF_WIDTH));
    cid.finish();

    pdf.font_descriptor(descriptor_id)
        .name(base_name)
        .flags(FontFlags::SERIF | FontFlags::SYMBOLIC)
        .bbox(Rect::new(-25.0, -254.0, 1000.0, 880.0))
        .italic_angle(0.0)
        .ascent(880.0)
        .descent(-120.0)
        .cap_height(880.0)
        .stem_v(93.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_widths() {
        // "Hello" = 722 + 556 + 222 + 222 + 556
        let width = FontFace::Helvetica.text_width("Hello", 10.0);
        assert!((width - 22.78).abs() < 1e-3);
        assert!(FontFace::HelveticaBold.text_width("Hello", 10.0) > width);
    }

    #[test]
    fn test_courier_is_monospaced() {
        assert_eq!(FontFace::Courier.text_width("iiii", 10.0), 24.0);
        assert_eq!(FontFace::Courier.text_width("MMMM", 10.0), 24.0);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(
            FontFace::Helvetica.text_width("é", 10.0),
            FontFace::Helvetica.text_width("e", 10.0)
        );
    }

    #[test]
    fn test_cjk_widths() {
        assert_eq!(FontFace::StSongLight.text_width("代码", 10.0), 20.0);
        assert_eq!(FontFace::StSongLight.text_width("ab", 10.0), 10.0);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(FontFace::Helvetica.encode("Dépôt"), b"D\xe9p\xf4t".to_vec());
        assert_eq!(FontFace::Helvetica.encode("• x"), b"\x95 x".to_vec());
        assert_eq!(FontFace::Helvetica.encode("代"), b"?".to_vec());
    }

    #[test]
    fn test_ucs2_encoding() {
        assert_eq!(FontFace::StSongLight.encode("代a"), vec![0x4E, 0xE3, 0x00, 0x61]);
        assert_eq!(FontFace::StSongLight.encode("😀"), vec![0x00, 0x3F]);
    }
}
