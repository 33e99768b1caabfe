//! CSV intake for LKPS upload templates.

mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::workflows::lkps::{FieldValue, TableCode, TablePlugin, TableRecord};

/// Leading rows skipped for tables without a plugin.
const UNREGISTERED_HEADER_ROWS: usize = 1;

#[derive(Debug)]
pub enum SpreadsheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for SpreadsheetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadsheetImportError::Io(err) => write!(f, "failed to read spreadsheet: {}", err),
            SpreadsheetImportError::Csv(err) => write!(f, "invalid spreadsheet CSV data: {}", err),
        }
    }
}

impl std::error::Error for SpreadsheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpreadsheetImportError::Io(err) => Some(err),
            SpreadsheetImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SpreadsheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SpreadsheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Rows recovered from one uploaded sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSheet {
    pub code: TableCode,
    pub records: Vec<TableRecord>,
    /// Records belong in the candidate pool rather than the scored row set.
    pub into_candidates: bool,
    /// Data-area rows dropped as blank, column-number or summary rows.
    pub skipped: usize,
}

pub struct SpreadsheetImporter;

impl SpreadsheetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        code: &TableCode,
        plugin: Option<&dyn TablePlugin>,
    ) -> Result<ImportedSheet, SpreadsheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, code, plugin)
    }

    /// Maps data rows through the plugin's field mapping, or to `col_1..col_N` when the
    /// table has no plugin.
    pub fn from_reader<R: Read>(
        reader: R,
        code: &TableCode,
        plugin: Option<&dyn TablePlugin>,
    ) -> Result<ImportedSheet, SpreadsheetImportError> {
        let rows = parser::parse_rows(reader)?;
        let header_rows = plugin
            .map(|plugin| plugin.schema().header_rows)
            .unwrap_or(UNREGISTERED_HEADER_ROWS);
        let into_candidates = plugin
            .map(|plugin| plugin.schema().allows_selection)
            .unwrap_or(false);
        let mapping = plugin.map(|plugin| plugin.field_mapping());

        let mut records = Vec::new();
        let mut skipped = 0;
        for cells in rows.into_iter().skip(header_rows) {
            if normalizer::is_blank_row(&cells)
                || normalizer::is_numeric_row(&cells)
                || normalizer::is_summary_row(&cells)
            {
                skipped += 1;
                continue;
            }

            let sequence = records.len() as u32 + 1;
            let mut record = TableRecord::new(format!("{code}-{sequence}"), sequence);
            record.selected = !into_candidates;
            match &mapping {
                Some(mapping) => {
                    for (field, position) in mapping {
                        let value = cells.get(*position).cloned().unwrap_or_default();
                        record.set_field(field, FieldValue::Text(value));
                    }
                }
                None => {
                    for (index, value) in cells.into_iter().enumerate() {
                        record.set_field(&format!("col_{}", index + 1), FieldValue::Text(value));
                    }
                }
            }
            records.push(record);
        }

        let records = match plugin {
            Some(plugin) => plugin.normalize_data(records),
            None => records,
        };
        debug!(table = %code, rows = records.len(), skipped, "spreadsheet parsed");

        Ok(ImportedSheet {
            code: code.clone(),
            records,
            into_candidates,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lkps::plugins::{FundedActivityPlugin, StudentInvolvementPlugin};
    use std::io::Cursor;

    #[test]
    fn normalize_cell_strips_invisible_characters() {
        assert_eq!(
            normalizer::normalize_for_tests("\u{feff}Lembaga\u{200b}  Luar\tNegeri "),
            "Lembaga Luar Negeri"
        );
    }

    #[test]
    fn funded_activity_sheet_skips_headers_numbering_and_totals() {
        let csv = "\
No,Sumber Pembiayaan,Jumlah Judul,,,
,,TS-2,TS-1,TS,Jumlah
1,2,3,4,5,6
1,Perguruan Tinggi / Mandiri,2,2,2,6
,,,,,
2,Lembaga Luar Negeri,1,0,1,2
,Jumlah,3,2,3,8
";
        let plugin = FundedActivityPlugin::research();
        let sheet = SpreadsheetImporter::from_reader(
            Cursor::new(csv),
            &TableCode::new("3b2"),
            Some(&plugin),
        )
        .expect("sheet parses");

        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.skipped, 3);
        assert!(!sheet.into_candidates);
        let first = &sheet.records[0];
        assert_eq!(first.key, "3b2-1");
        assert!(first.selected);
        assert_eq!(first.text("sumber_pembiayaan"), "Perguruan Tinggi / Mandiri");
        assert_eq!(first.number("jumlah"), 6.0);
        assert_eq!(sheet.records[1].number("ts2"), 1.0);
    }

    #[test]
    fn selection_tables_import_unselected_candidates() {
        let csv = "\
No,Nama Dosen,Tema,Nama Mahasiswa,Judul Kegiatan,Tahun
1,Dr. Sari,Energi,Andi,Panel surya desa,2023
";
        let plugin = StudentInvolvementPlugin::research();
        let sheet =
            SpreadsheetImporter::from_reader(Cursor::new(csv), &TableCode::new("6a"), Some(&plugin))
                .expect("sheet parses");

        assert!(sheet.into_candidates);
        assert_eq!(sheet.records.len(), 1);
        assert!(!sheet.records[0].selected);
        assert_eq!(sheet.records[0].text("nama_mahasiswa"), "Andi");
    }

    #[test]
    fn unregistered_tables_use_positional_columns() {
        let csv = "A,B\nsatu,dua,tiga\n";
        let sheet = SpreadsheetImporter::from_reader(Cursor::new(csv), &TableCode::new("9z"), None)
            .expect("sheet parses");

        assert_eq!(sheet.records.len(), 1);
        let record = &sheet.records[0];
        assert_eq!(record.text("col_1"), "satu");
        assert_eq!(record.text("col_3"), "tiga");
    }

    #[test]
    fn invalid_utf8_surfaces_csv_error() {
        let bytes: &[u8] = b"No,Nama\n1,\xff\xfe\n";
        let result = SpreadsheetImporter::from_reader(bytes, &TableCode::new("9z"), None);
        assert!(matches!(result, Err(SpreadsheetImportError::Csv(_))));
    }

    #[test]
    fn entries_starting_with_summary_words_are_kept() {
        let csv = "\
No,Nama Dosen,Luaran,Tahun,Keterangan
1,Dr. Sari,Total Station Digital,2023,Alat ukur
2,Budi,Jumlah Sensor Tanah,2024,Purwarupa
,Total:,,,
,Rata-rata,,,
";
        let sheet = SpreadsheetImporter::from_reader(Cursor::new(csv), &TableCode::new("9z"), None)
            .expect("sheet parses");

        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.skipped, 2);
        assert_eq!(sheet.records[0].text("col_3"), "Total Station Digital");
    }
}
