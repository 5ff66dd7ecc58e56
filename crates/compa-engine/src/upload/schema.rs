//! Header check and row decoding.

use compa_core::InputField;

use crate::batch::{PendingRow, RawRow};
use crate::error::BatchError;
use crate::upload::sheet::Sheet;

/// Decode an upload into pending rows.
///
/// The header must have the seven input columns in order, each matching
/// its label or a synonym. Extra trailing header cells are ignored. Rows
/// whose first three cells are empty are skipped; the remaining rows keep
/// their 1-based position among the data rows.
///
/// # Errors
///
/// [`BatchError::MalformedUpload`] if the sheet is empty or the header is
/// wrong.
pub fn decode_sheet(sheet: &Sheet) -> Result<Vec<PendingRow>, BatchError> {
    let header = sheet
        .header()
        .ok_or_else(|| BatchError::malformed("upload has no header row"))?;
    check_header(header)?;

    let rows = sheet
        .data_rows()
        .iter()
        .enumerate()
        .map(|(i, cells)| PendingRow::new(i + 1, RawRow::from_cells(cells)))
        .filter(|row| !row.raw.is_blank())
        .collect();
    Ok(rows)
}

fn check_header(header: &[Option<String>]) -> Result<(), BatchError> {
    for field in InputField::ALL {
        let column = field.column();
        let cell = header
            .get(column)
            .and_then(|c| c.as_deref())
            .unwrap_or_default();
        if !field.matches_header(cell) {
            return Err(BatchError::malformed(format!(
                "Invalid header at column {}. Expected '{}', found '{}'",
                column + 1,
                field.label(),
                cell.trim()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 7] = [
        "Employee Code",
        "Employee Name",
        "Job Title",
        "Years of Experience",
        "Performance Rating",
        "Current Salary",
        "Mid of Scale",
    ];

    #[test]
    fn test_decodes_rows_in_order() {
        let sheet = Sheet::from_text([
            HEADER.to_vec(),
            vec!["E1", "Ada", "Eng", "6", "5", "60000", "100000"],
            vec!["E2", "Bob", "Ops", "2", "1", "120000", "100000"],
        ]);
        let rows = decode_sheet(&sheet).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_index, 1);
        assert_eq!(rows[1].raw.employee_code.as_deref(), Some("E2"));
    }

    #[test]
    fn test_blank_rows_skipped_but_numbering_kept() {
        let sheet = Sheet::from_text([
            HEADER.to_vec(),
            vec!["E1", "Ada", "Eng", "6", "5", "60000", "100000"],
            vec!["", "", "", "", "", "", ""],
            vec!["E3", "Cy", "Eng", "1", "3", "90000", "100000"],
        ]);
        let rows = decode_sheet(&sheet).unwrap();
        let indices: Vec<usize> = rows.iter().map(|r| r.row_index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_synonyms_and_case_accepted() {
        let sheet = Sheet::from_text([vec![
            "EMP CODE",
            "name",
            "Position",
            "years  experience",
            "Performance Rating (1-5)",
            "Salary",
            "Midpoint",
        ]]);
        assert!(decode_sheet(&sheet).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_header_names_column() {
        let mut header = HEADER.to_vec();
        header[5] = "Bonus";
        let err = decode_sheet(&Sheet::from_text([header])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed upload: Invalid header at column 6. Expected 'Current Salary', found 'Bonus'"
        );
    }

    #[test]
    fn test_short_header_rejected() {
        let err = decode_sheet(&Sheet::from_text([HEADER[..4].to_vec()])).unwrap_err();
        assert!(matches!(err, BatchError::MalformedUpload { .. }));
    }

    #[test]
    fn test_empty_sheet_rejected() {
        let err = decode_sheet(&Sheet::default()).unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }
}
