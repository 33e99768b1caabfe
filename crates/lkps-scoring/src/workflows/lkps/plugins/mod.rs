//! Table plugins, one module per LKPS table family.

mod cooperation;
mod faculty;
mod funding;
mod involvement;
mod outputs;
mod publication;
mod recognition;

pub use cooperation::CooperationPlugin;
pub use faculty::{AdjunctFacultyPlugin, PermanentFacultyPlugin, WorkloadPlugin};
pub use funding::{FundedActivity, FundedActivityPlugin};
pub use involvement::{StudentInvolvementPlugin, SupervisedActivity};
pub use outputs::{FacultyOutputPlugin, StudentOutputPlugin};
pub use publication::PublicationPlugin;
pub use recognition::{CitationPlugin, RecognitionPlugin};

use super::domain::{ScoreDetail, TableRecord};
use super::plugin::ScoreContext;

/// Table holding the permanent faculty roster; source of `NDTPS` and `NDT`.
pub const FACULTY_TABLE: &str = "3a1";

/// Permanent faculty headcount (`NDTPS`) saved by the roster table.
///
/// Pushes a warning and returns `None` when the roster has not been scored yet.
pub(crate) fn faculty_headcount(ctx: &ScoreContext<'_>, warnings: &mut Vec<String>) -> Option<f64> {
    match ctx.dependency(FACULTY_TABLE) {
        Some(detail) => Some(detail.value("NDTPS")),
        None => {
            warnings.push(format!(
                "table {FACULTY_TABLE} has not been saved yet; NDTPS treated as 0"
            ));
            None
        }
    }
}

/// Three-year activity total for a row: TS-2 + TS-1 + TS, or the stated total when the
/// yearly cells are empty.
pub(crate) fn yearly_total(record: &TableRecord) -> f64 {
    let by_year = record.number("ts2") + record.number("ts1") + record.number("ts");
    if by_year > 0.0 {
        by_year
    } else {
        record.number("jumlah")
    }
}

/// Lower-cased, whitespace-collapsed text used for category matching.
pub(crate) fn folded(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub(crate) fn detail_from(pairs: &[(&str, f64)]) -> ScoreDetail {
    pairs.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_total_prefers_year_columns() {
        let record = TableRecord::new("r", 1)
            .with_field("ts2", 1.0)
            .with_field("ts1", 2.0)
            .with_field("ts", 3.0)
            .with_field("jumlah", 99.0);
        assert_eq!(yearly_total(&record), 6.0);

        let record = TableRecord::new("r", 1).with_field("jumlah", 4.0);
        assert_eq!(yearly_total(&record), 4.0);
    }

    #[test]
    fn folded_normalizes_case_and_spacing() {
        assert_eq!(folded("  Lembaga   Luar Negeri "), "lembaga luar negeri");
    }
}
