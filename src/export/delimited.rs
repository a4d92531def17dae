//! CSV serializer
//!
//! Every field is double-quoted and embedded quotes are doubled, header
//! row first, `\n` line endings.

use super::{ExportRow, COLUMNS};
use crate::error::{AuditError, Result};

pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(COLUMNS)
        .map_err(|e| AuditError::export("csv", e))?;
    for row in rows {
        writer
            .write_record(row.cells())
            .map_err(|e| AuditError::export("csv", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| AuditError::export("csv", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(action: &str) -> ExportRow {
        ExportRow {
            user: "alice".to_string(),
            action: action.to_string(),
            action_type: "update".to_string(),
            severity: "low".to_string(),
            target: String::new(),
            status: "success".to_string(),
            timestamp: "2024-05-15T12:00:00Z".to_string(),
            details: String::new(),
        }
    }

    #[test]
    fn test_header_first_and_all_fields_quoted() {
        let bytes = write_csv(&[row("Logged in")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            r#""User","Action","Action Type","Severity","Target","Status","Timestamp","Details""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""alice","Logged in","update","low","","success","2024-05-15T12:00:00Z","""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let bytes = write_csv(&[row(r#"said "hi", then left"#)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""said ""hi"", then left""#));
    }

    #[test]
    fn test_embedded_newline_stays_inside_field() {
        let bytes = write_csv(&[row("line one\nline two")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"line one\nline two\""));
    }

    #[test]
    fn test_empty_set_has_header_only() {
        let bytes = write_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
    }
}
