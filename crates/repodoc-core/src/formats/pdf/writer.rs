// SPDX-License-Identifier: AGPL-3.0-or-later
//! Serialise laid-out pages with pdf-writer

use super::fonts::write_font;
use super::layout::{DrawOp, PageLayout};
use crate::style::FontFace;
use crate::traits::PageConfig;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::BTreeSet;

/// Build the PDF file for `pages`
///
/// Object numbering and font order depend only on the input, so equal
/// input gives byte-identical output.
pub(crate) fn write_pdf(pages: &[PageLayout], config: &PageConfig, title: &str) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();

    let faces: BTreeSet<FontFace> = pages
        .iter()
        .flat_map(|page| &page.ops)
        .filter_map(|op| match op {
            DrawOp::Text { face, .. } => Some(*face),
            DrawOp::Rect { .. } => None,
        })
        .collect();
    let fonts: Vec<(FontFace, Ref)> = faces.into_iter().map(|face| (face, alloc.bump())).collect();

    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        {
            let mut page_writer = pdf.page(*page_id);
            page_writer.media_box(Rect::new(0.0, 0.0, config.width, config.height));
            page_writer.parent(tree_id);
            page_writer.contents(*content_id);
            let mut resources = page_writer.resources();
            let mut font_dict = resources.fonts();
            for (face, font_id) in &fonts {
                font_dict.pair(Name(face.resource_name()), *font_id);
            }
        }
        pdf.stream(*content_id, &page_content(page));
    }

    for (face, font_id) in &fonts {
        write_font(&mut pdf, *face, *font_id, &mut alloc);
    }

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(&config.producer));

    pdf.finish()
}

fn page_content(page: &PageLayout) -> Vec<u8> {
    let mut content = Content::new();

    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                content.set_fill_rgb(color.r, color.g, color.b);
                content.rect(*x, *y, *width, *height);
                content.fill_nonzero();
            }
            DrawOp::Text {
                x,
                y,
                face,
                size,
                color,
                text,
            } => {
                content.set_fill_rgb(color.r, color.g, color.b);
                content.begin_text();
                content.set_font(Name(face.resource_name()), *size);
                content.next_line(*x, *y);
                content.show(Str(&face.encode(text)));
                content.end_text();
            }
        }
    }

    content.finish()
}
