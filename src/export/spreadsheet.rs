//! XLSX serializer: one worksheet named "Audit Logs"

use super::{ExportRow, COLUMNS};
use crate::error::{AuditError, Result};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

pub const SHEET_NAME: &str = "Audit Logs";

/// Longest string Excel accepts in a single cell
const MAX_CELL_CHARS: usize = 32_767;

const COLUMN_WIDTHS: [f64; 8] = [18.0, 36.0, 12.0, 10.0, 24.0, 10.0, 22.0, 48.0];

pub fn write_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>> {
    build_workbook(rows).map_err(|e| AuditError::export("xlsx", e))
}

fn build_workbook(rows: &[ExportRow]) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, cell) in row.cells().iter().enumerate() {
            sheet.write_string(row_num, col as u16, clamp_cell(cell))?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    workbook.save_to_buffer()
}

fn clamp_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
