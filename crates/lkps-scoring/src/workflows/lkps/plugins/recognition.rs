use super::{detail_from, faculty_headcount};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

const RECOGNITION_RULES: &[ValidationRule] = &[
    ValidationRule::required("nama_dosen", "Nama dosen wajib diisi"),
    ValidationRule::required("rekognisi", "Rekognisi dan bukti pendukung wajib diisi"),
];

/// Tabel 3.b.1, recognitions earned by DTPS. Butir 22: `RRD = NRD / NDTPS`.
pub struct RecognitionPlugin {
    schema: TableSchema,
}

impl RecognitionPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Pengakuan/Rekognisi DTPS",
                vec![
                    ColumnSpec::text("nama_dosen", "Nama Dosen", 1),
                    ColumnSpec::text("bidang_keahlian", "Bidang Keahlian", 2),
                    ColumnSpec::text("rekognisi", "Rekognisi dan Bukti Pendukung", 3),
                    ColumnSpec::flag("wilayah", "Tingkat Wilayah", 4),
                    ColumnSpec::flag("nasional", "Tingkat Nasional", 5),
                    ColumnSpec::flag("internasional", "Tingkat Internasional", 6),
                    ColumnSpec::text("tahun", "Tahun", 7),
                ],
            )
            .header_rows(2),
        }
    }
}

impl Default for RecognitionPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for RecognitionPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3b1"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        RECOGNITION_RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let rows = self.countable(records);
        let nrd = rows.len() as f64;
        let by_level = |field: &str| rows.iter().filter(|record| record.flag(field)).count() as f64;
        let mut detail = detail_from(&[
            ("NRD", nrd),
            ("NRD_WILAYAH", by_level("wilayah")),
            ("NRD_NASIONAL", by_level("nasional")),
            ("NRD_INTERNASIONAL", by_level("internasional")),
        ]);

        if rows.is_empty() {
            detail.insert("NDTPS", 0.0);
            detail.insert("RRD", 0.0);
            return ScoreOutcome::single(22, 0.0, detail);
        }

        let mut warnings = Vec::new();
        let ndtps = faculty_headcount(ctx, &mut warnings).unwrap_or(0.0);
        let (rrd, nilai) = config.recognition.score_ratio(nrd, ndtps);
        detail.insert("NDTPS", ndtps);
        detail.insert("RRD", rrd.unwrap_or(0.0));

        ScoreOutcome::single(22, nilai, detail).with_warnings(warnings)
    }
}

const CITATION_RULES: &[ValidationRule] = &[
    ValidationRule::required("nama_dosen", "Nama dosen wajib diisi"),
    ValidationRule::required("judul_artikel", "Judul artikel wajib diisi"),
];

/// Tabel 3.b.5, cited faculty articles. Butir 26: `RS = NAS / NDTPS`, counting only
/// articles with at least one citation.
pub struct CitationPlugin {
    schema: TableSchema,
}

impl CitationPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Karya Ilmiah DTPS yang Disitasi",
                vec![
                    ColumnSpec::text("nama_dosen", "Nama Dosen", 1),
                    ColumnSpec::text("judul_artikel", "Judul Artikel yang Disitasi", 2),
                    ColumnSpec::count("jumlah_sitasi", "Jumlah Sitasi", 3),
                ],
            ),
        }
    }
}

impl Default for CitationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for CitationPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3b5"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        CITATION_RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let rows = self.countable(records);
        let nas = rows
            .iter()
            .filter(|record| record.number("jumlah_sitasi") > 0.0)
            .count() as f64;
        let citations: f64 = rows.iter().map(|record| record.number("jumlah_sitasi")).sum();

        if rows.is_empty() {
            return ScoreOutcome::single(
                26,
                0.0,
                detail_from(&[("NAS", 0.0), ("SITASI", 0.0), ("NDTPS", 0.0), ("RS", 0.0)]),
            );
        }

        let mut warnings = Vec::new();
        let ndtps = faculty_headcount(ctx, &mut warnings).unwrap_or(0.0);
        let (rs, nilai) = config.citation.score_ratio(nas, ndtps);

        ScoreOutcome::single(
            26,
            nilai,
            detail_from(&[
                ("NAS", nas),
                ("SITASI", citations),
                ("NDTPS", ndtps),
                ("RS", rs.unwrap_or(0.0)),
            ]),
        )
        .with_warnings(warnings)
    }
}
