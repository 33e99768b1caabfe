use super::{detail_from, faculty_headcount, folded};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreDetail, ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

/// Output categories shared by the faculty and student output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputCategory {
    /// I: patents and simple patents
    Patent,
    /// II: copyright, industrial design and other IP
    Copyright,
    /// III: appropriate technology, products, works of art, social engineering
    Product,
    /// IV: books with ISBN and book chapters
    Book,
}

impl OutputCategory {
    const ALL: [Self; 4] = [Self::Patent, Self::Copyright, Self::Product, Self::Book];

    fn key(self) -> &'static str {
        match self {
            Self::Patent => "NA",
            Self::Copyright => "NB",
            Self::Product => "NC",
            Self::Book => "ND",
        }
    }

    fn from_roman(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "I" | "1" => Some(Self::Patent),
            "II" | "2" => Some(Self::Copyright),
            "III" | "3" => Some(Self::Product),
            "IV" | "4" => Some(Self::Book),
            _ => None,
        }
    }

    fn from_description(raw: &str) -> Option<Self> {
        let text = folded(raw);
        if text.contains("paten") {
            Some(Self::Patent)
        } else if text.contains("hak cipta") || text.contains("desain industri") || text.contains("hki") {
            Some(Self::Copyright)
        } else if text.contains("buku") || text.contains("isbn") {
            Some(Self::Book)
        } else if text.contains("teknologi tepat guna")
            || text.contains("produk")
            || text.contains("karya seni")
            || text.contains("rekayasa sosial")
        {
            Some(Self::Product)
        } else {
            None
        }
    }
}

/// `NLP = 2 × (NA + NB + NC) + ND`
fn weighted_outputs(detail: &ScoreDetail) -> f64 {
    2.0 * (detail.value("NA") + detail.value("NB") + detail.value("NC")) + detail.value("ND")
}

const FACULTY_RULES: &[ValidationRule] = &[ValidationRule::required(
    "luaran",
    "Luaran penelitian/PkM wajib diisi",
)];

/// Tabel 3.b.7, research and PkM outputs of DTPS. Butir 28: `RLP = NLP / NDTPS`.
pub struct FacultyOutputPlugin {
    schema: TableSchema,
}

impl FacultyOutputPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Luaran Penelitian/PkM Lainnya oleh DTPS",
                vec![
                    ColumnSpec::text("luaran", "Luaran Penelitian dan PkM", 1),
                    ColumnSpec::text("tahun", "Tahun", 2),
                    ColumnSpec::text("keterangan", "Keterangan", 3),
                    ColumnSpec::text("kategori", "Kategori (I-IV)", 4),
                ],
            ),
        }
    }
}

impl Default for FacultyOutputPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for FacultyOutputPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3b7"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        FACULTY_RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let mut warnings = Vec::new();
        let mut detail = detail_from(&OutputCategory::ALL.map(|category| (category.key(), 0.0)));
        let rows = self.countable(records);

        for record in &rows {
            let category = OutputCategory::from_roman(&record.text("kategori"))
                .or_else(|| OutputCategory::from_description(&record.text("luaran")));
            match category {
                Some(category) => {
                    let key = category.key();
                    detail.insert(key, detail.value(key) + 1.0);
                }
                None => warnings.push(format!(
                    "row {}: output category could not be determined; excluded from scoring",
                    record.sequence
                )),
            }
        }

        let nlp = weighted_outputs(&detail);
        detail.insert("NLP", nlp);

        if rows.is_empty() {
            detail.insert("NDTPS", 0.0);
            detail.insert("RLP", 0.0);
            return ScoreOutcome::single(28, 0.0, detail);
        }

        let ndtps = faculty_headcount(ctx, &mut warnings).unwrap_or(0.0);
        let (rlp, nilai) = config.faculty_output.score_ratio(nlp, ndtps);
        detail.insert("NDTPS", ndtps);
        detail.insert("RLP", rlp.unwrap_or(0.0));

        ScoreOutcome::single(28, nilai, detail).with_warnings(warnings)
    }
}

const STUDENT_FAMILY: [&str; 4] = ["8f5-1", "8f5-2", "8f5-3", "8f5-4"];

const STUDENT_RULES: &[ValidationRule] = &[ValidationRule::required(
    "luaran",
    "Luaran penelitian/PkM mahasiswa wajib diisi",
)];

/// Tabel 8.f.5 parts I–IV, research and PkM outputs of students. Butir 63.
///
/// Each part holds one output category. Saving any part combines its own rows with the
/// counts persisted by the sibling parts.
pub struct StudentOutputPlugin {
    schema: TableSchema,
}

impl StudentOutputPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Luaran Penelitian/PkM yang Dihasilkan Mahasiswa",
                vec![
                    ColumnSpec::text("luaran", "Luaran Penelitian dan PkM", 1),
                    ColumnSpec::text("tahun", "Tahun", 2),
                    ColumnSpec::text("keterangan", "Keterangan", 3),
                ],
            ),
        }
    }

    fn category_for(code: &TableCode) -> Option<OutputCategory> {
        STUDENT_FAMILY
            .iter()
            .position(|member| *member == code.as_str())
            .map(|index| OutputCategory::ALL[index])
    }
}

impl Default for StudentOutputPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for StudentOutputPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &STUDENT_FAMILY
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        STUDENT_RULES
    }

    fn calculate_score(
        &self,
        code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let Some(own) = Self::category_for(code) else {
            return ScoreOutcome::single(63, 0.0, ScoreDetail::new()).with_warning(format!(
                "table {code} is not part of the {} family",
                STUDENT_FAMILY.join("/")
            ));
        };

        let mut detail = ScoreDetail::new();
        for (member, category) in STUDENT_FAMILY.iter().zip(OutputCategory::ALL) {
            let count = if category == own {
                self.countable(records).len() as f64
            } else {
                ctx.optional(member)
                    .map(|sibling| sibling.value(category.key()))
                    .unwrap_or(0.0)
            };
            detail.insert(category.key(), count);
        }

        let nlp = weighted_outputs(&detail);
        detail.insert("NLP", nlp);

        let nilai = if nlp == 0.0 {
            0.0
        } else {
            config.student_output.score(nlp)
        };
        ScoreOutcome::single(63, nilai, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_from_roman_numerals_and_descriptions() {
        assert_eq!(OutputCategory::from_roman("iii"), Some(OutputCategory::Product));
        assert_eq!(OutputCategory::from_roman("IV"), Some(OutputCategory::Book));
        assert_eq!(OutputCategory::from_roman("V"), None);
        assert_eq!(
            OutputCategory::from_description("Paten sederhana alat pengering"),
            Some(OutputCategory::Patent)
        );
        assert_eq!(
            OutputCategory::from_description("Hak Cipta aplikasi presensi"),
            Some(OutputCategory::Copyright)
        );
        assert_eq!(
            OutputCategory::from_description("Buku ajar ber-ISBN"),
            Some(OutputCategory::Book)
        );
        assert_eq!(
            OutputCategory::from_description("Teknologi Tepat Guna pengolah sampah"),
            Some(OutputCategory::Product)
        );
    }

    #[test]
    fn family_members_map_to_categories() {
        assert_eq!(
            StudentOutputPlugin::category_for(&TableCode::new("8f5-1")),
            Some(OutputCategory::Patent)
        );
        assert_eq!(
            StudentOutputPlugin::category_for(&TableCode::new("8f5-4")),
            Some(OutputCategory::Book)
        );
        assert_eq!(StudentOutputPlugin::category_for(&TableCode::new("8f5")), None);
    }
}
