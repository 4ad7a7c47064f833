// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use repodoc_core::{Locale, MarkdownHandler, Parser, PdfRenderer, Renderer, StyleSet};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let doc = MarkdownHandler::new().parse(text);
    for block in &doc.blocks {
        if let repodoc_core::Block::Heading { level, .. } = block {
            assert!((1..=3).contains(level));
        }
    }

    let locale = if data.first().is_some_and(|b| b % 2 == 0) {
        Locale::En
    } else {
        Locale::Zh
    };
    let style = StyleSet::for_locale(locale);
    // Oversized lines are a render error, never a panic.
    let _ = PdfRenderer::new().render(&doc, &style, locale.profile().display_title);
});
