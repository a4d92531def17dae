//! Paginated PDF table report
//!
//! A4 landscape. The first page carries the title and a "Generated at"
//! line; every page repeats the accent-filled table header and a page
//! footer.

use super::{ExportRow, COLUMNS};
use crate::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};
use std::ops::Range;

pub const REPORT_TITLE: &str = "Audit Logs Report";

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 7.0;
const FIRST_TABLE_TOP: f32 = 178.0;
const TABLE_TOP: f32 = 198.0;
const TABLE_BOTTOM: f32 = 16.0;
const CELL_PADDING: f32 = 1.5;
/// Rough width of one Helvetica glyph per point of font size, in mm
const GLYPH_MM_PER_PT: f32 = 0.19;

const COLUMN_WIDTHS: [f32; 8] = [30.0, 50.0, 22.0, 20.0, 35.0, 20.0, 40.0, 60.0];

/// Visual settings for the report
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStyle {
    /// Header row fill, RGB
    pub accent: [u8; 3],
    pub title_size: f32,
    pub body_size: f32,
}

impl Default for PdfStyle {
    fn default() -> Self {
        Self {
            accent: [41, 128, 185],
            title_size: 16.0,
            body_size: 8.0,
        }
    }
}

/// Body rows per page: the first page loses room to the title block
fn rows_per_page(first: bool) -> usize {
    let top = if first { FIRST_TABLE_TOP } else { TABLE_TOP };
    // one row height is taken by the header
    (((top - TABLE_BOTTOM) / ROW_HEIGHT) as usize).saturating_sub(1).max(1)
}

/// Split `total` rows into per-page index ranges
///
/// Always yields at least one page so an empty report still renders.
pub fn paginate(total: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + rows_per_page(pages.is_empty())).min(total);
        pages.push(start..end);
        if end >= total {
            break;
        }
        start = end;
    }
    pages
}

pub fn write_pdf(rows: &[ExportRow], now: DateTime<Utc>, style: &PdfStyle) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Table",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AuditError::export("pdf", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AuditError::export("pdf", e))?;
    let fonts = Fonts { regular, bold };

    let pages = paginate(rows.len());
    let page_count = pages.len();

    for (number, range) in pages.into_iter().enumerate() {
        let layer = if number == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            new_page(&doc)
        };

        let table_top = if number == 0 {
            draw_title_block(&layer, &fonts, now, style);
            FIRST_TABLE_TOP
        } else {
            TABLE_TOP
        };

        draw_header(&layer, &fonts, table_top, style);
        let body = &rows[range];
        if body.is_empty() && number == 0 {
            set_text_color(&layer, [0, 0, 0]);
            layer.use_text(
                "No audit logs match the current filters.",
                style.body_size,
                Mm(MARGIN + CELL_PADDING),
                Mm(table_top - ROW_HEIGHT * 2.0 + 2.0),
                &fonts.regular,
            );
        }
        for (i, row) in body.iter().enumerate() {
            let baseline = table_top - ROW_HEIGHT * (i as f32 + 2.0) + 2.0;
            draw_row(&layer, &fonts.regular, row, baseline, style.body_size);
        }

        set_text_color(&layer, [110, 110, 110]);
        layer.use_text(
            format!("Page {} of {}", number + 1, page_count),
            style.body_size,
            Mm(PAGE_WIDTH - MARGIN - 25.0),
            Mm(MARGIN - 2.0),
            &fonts.regular,
        );
    }

    doc.save_to_bytes().map_err(|e| AuditError::export("pdf", e))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
    doc.get_page(page).get_layer(layer)
}

fn set_text_color(layer: &PdfLayerReference, rgb: [u8; 3]) {
    layer.set_fill_color(rgb_color(rgb));
}

fn rgb_color([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn draw_title_block(layer: &PdfLayerReference, fonts: &Fonts, now: DateTime<Utc>, style: &PdfStyle) {
    set_text_color(layer, [0, 0, 0]);
    layer.use_text(
        REPORT_TITLE,
        style.title_size,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - MARGIN - 6.0),
        &fonts.bold,
    );
    layer.use_text(
        format!("Generated at: {}", now.format("%Y-%m-%d %H:%M:%S UTC")),
        style.body_size + 1.0,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - MARGIN - 14.0),
        &fonts.regular,
    );
}

fn draw_header(layer: &PdfLayerReference, fonts: &Fonts, top: f32, style: &PdfStyle) {
    let width: f32 = COLUMN_WIDTHS.iter().sum();
    layer.set_fill_color(rgb_color(style.accent));
    layer.add_rect(Rect::new(
        Mm(MARGIN),
        Mm(top - ROW_HEIGHT),
        Mm(MARGIN + width),
        Mm(top),
    ));

    set_text_color(layer, [255, 255, 255]);
    let mut x = MARGIN;
    for (title, col_width) in COLUMNS.iter().zip(COLUMN_WIDTHS) {
        layer.use_text(
            fit_cell(title, col_width, style.body_size),
            style.body_size,
            Mm(x + CELL_PADDING),
            Mm(top - ROW_HEIGHT + 2.0),
            &fonts.bold,
        );
        x += col_width;
    }
}

fn draw_row(layer: &PdfLayerReference, font: &IndirectFontRef, row: &ExportRow, baseline: f32, size: f32) {
    set_text_color(layer, [0, 0, 0]);
    let mut x = MARGIN;
    for (cell, col_width) in row.cells().iter().zip(COLUMN_WIDTHS) {
        layer.use_text(
            fit_cell(cell, col_width, size),
            size,
            Mm(x + CELL_PADDING),
            Mm(baseline),
            font,
        );
        x += col_width;
    }
}

/// Single-line, WinAnsi-safe text truncated to the column width
fn fit_cell(text: &str, col_width: f32, size: f32) -> String {
    let max_chars = ((col_width - 2.0 * CELL_PADDING) / (size * GLYPH_MM_PER_PT)).max(1.0) as usize;
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if (c as u32) < 0x20 || (c as u32) > 0xFF => '?',
            c => c,
        })
        .collect();

    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = cleaned.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}
