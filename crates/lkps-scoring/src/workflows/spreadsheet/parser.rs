use std::io::Read;

use super::normalizer::normalize_cell;

/// Reads every row as normalized text cells. Templates have merged headers and ragged
/// rows, so no header handling happens here.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    Ok(rows)
}
