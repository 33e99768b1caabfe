const INVISIBLE: [char; 5] = ['\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}'];

const SUMMARY_LABELS: [&str; 5] = ["jumlah", "total", "rata-rata", "rerata", "average"];

/// Summary labels sit in the number column or the first label column.
const SUMMARY_LABEL_COLUMNS: usize = 2;

/// Strips byte-order marks and zero-width characters, then collapses whitespace.
pub(crate) fn normalize_cell(value: &str) -> String {
    let cleaned = value.replace(INVISIBLE, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn is_blank_row(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.is_empty())
}

/// Template rows that only number the columns ("1", "2", "3", ...).
pub(crate) fn is_numeric_row(cells: &[String]) -> bool {
    let mut filled = cells.iter().filter(|cell| !cell.is_empty()).peekable();
    filled.peek().is_some()
        && filled.all(|cell| {
            cell.trim_matches(|c| c == '(' || c == ')')
                .parse::<f64>()
                .is_ok()
        })
}

/// Totals and averages appended under the data rows. Only a bare label counts, so an
/// entry such as "Total Station" stays a data row.
pub(crate) fn is_summary_row(cells: &[String]) -> bool {
    cells
        .iter()
        .take(SUMMARY_LABEL_COLUMNS)
        .find(|cell| !cell.is_empty() && cell.parse::<f64>().is_err())
        .map(|cell| {
            let label = cell.trim_end_matches(':').trim().to_lowercase();
            SUMMARY_LABELS.contains(&label.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_cell(value)
}
