use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;

use crate::layout::{layout_single_page, paginate, PageLayout, PageSetup, POINTS_PER_MM};

/// PDF 產生失敗時的錯誤。 / Errors raised while producing a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load the built-in font: {0}")]
    Font(String),
    #[error("failed to serialise the PDF document: {0}")]
    Serialize(String),
}

/// Renders the text as a single-page PDF (export path).
/// 以單頁 PDF 匯出文字。
pub fn export_single_page(text: &str, setup: &PageSetup) -> Result<Vec<u8>, PdfError> {
    render_pages(&[layout_single_page(text, setup)], setup)
}

/// Renders the text across as many pages as it needs (print path).
/// 依內容分頁後輸出 PDF（列印用）。
pub fn render_paginated(text: &str, setup: &PageSetup) -> Result<Vec<u8>, PdfError> {
    render_pages(&paginate(text, setup), setup)
}

/// Writes prepared page layouts with the built-in Courier font.
pub fn render_pages(pages: &[PageLayout], setup: &PageSetup) -> Result<Vec<u8>, PdfError> {
    let (width_mm, height_mm) = setup.page_size_mm();
    let (document, first_page, first_layer) =
        PdfDocument::new(setup.title.as_str(), Mm(width_mm), Mm(height_mm), "Text");
    let font = document
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|err| PdfError::Font(err.to_string()))?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            document.add_page(
                Mm(width_mm),
                Mm(height_mm),
                format!("Text {}", page.page_number),
            )
        };
        let layer = document.get_page(page_index).get_layer(layer_index);
        for line in &page.lines {
            if line.text.trim().is_empty() {
                continue;
            }
            layer.use_text(
                line.text.as_str(),
                setup.font_size_pt,
                Mm(line.x_pt / POINTS_PER_MM),
                Mm(line.y_pt / POINTS_PER_MM),
                &font,
            );
        }
    }

    document
        .save_to_bytes()
        .map_err(|err| PdfError::Serialize(err.to_string()))
}
