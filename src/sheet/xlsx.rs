//! Workbook writer.
//!
//! One worksheet: a bold header row, then one row per statement line.
//! Fields the pattern did not capture are left as empty cells.

use std::path::Path;

use rust_xlsxwriter::{DocProperties, Format, Workbook};

use super::{RowTable, SheetError};

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Extracted Data";

/// Write `table` to `path` as an xlsx workbook.
pub fn write_workbook(table: &RowTable, path: &Path) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_author("stmtx"));

    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (row_idx, cells) in table.grid().enumerate() {
        let row = row_idx as u32;
        for (col_idx, cell) in cells.iter().enumerate() {
            let Some(value) = cell else { continue };
            let col = col_idx as u16;
            if row == 0 {
                worksheet.write_string_with_format(row, col, *value, &header)?;
            } else {
                worksheet.write_string(row, col, *value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::build_sheet;
    use crate::statement::extract_rows;
    use std::fs::File;
    use std::io::Read;
    use tempfile::tempdir;

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut contents = String::new();
        part.read_to_string(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_workbook_parts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let table = build_sheet(extract_rows(
            "01-Jan-2023 T M&S Food 12.00 88.00Dr\n03-Mar-2023 T ATM Withdrawal  2,500.00Dr",
        ));

        write_workbook(&table, &path).unwrap();

        let workbook = read_part(&path, "xl/workbook.xml");
        assert!(workbook.contains(r#"<sheet name="Extracted Data""#));

        let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), 3);
        assert!(sheet.contains(r#"r="E1""#));
        assert!(sheet.contains(r#"r="E3""#));
        // Missing amount on row 3 leaves D3 out
        assert!(!sheet.contains(r#"r="D3""#));

        let strings = read_part(&path, "xl/sharedStrings.xml");
        assert!(strings.contains("<t>Dr Amount</t>"));
        assert!(strings.contains("<t>M&amp;S Food</t>"));
        assert!(strings.contains("<t>2,500.00Dr</t>"));

        let styles = read_part(&path, "xl/styles.xml");
        assert!(styles.contains("<b/>"));
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let table = build_sheet(extract_rows("01-Jan-2023 T A 1.00 2.00Dr"));

        assert!(write_workbook(&table, &path).is_err());
    }
}
