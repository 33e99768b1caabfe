use super::{detail_from, faculty_headcount, folded, yearly_total};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::formulas::{blend_score, TierCounts, TierRatios};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

/// Publication venue as listed in the first column of Tabel 3.b.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Venue {
    /// NA1..NA4
    Journal(u8),
    /// NB1..NB3
    Seminar(u8),
    /// NC1..NC3
    MassMedia(u8),
}

impl Venue {
    fn classify(raw: &str) -> Option<Self> {
        let media = folded(raw);
        let reach = if media.contains("internasional") {
            3
        } else if media.contains("nasional") {
            2
        } else {
            1
        };

        if media.contains("jurnal") {
            let level = if media.contains("internasional bereputasi") {
                4
            } else if media.contains("internasional") {
                3
            } else if media.contains("tidak terakreditasi") {
                1
            } else if media.contains("terakreditasi") {
                2
            } else {
                1
            };
            Some(Self::Journal(level))
        } else if media.contains("seminar") {
            Some(Self::Seminar(reach))
        } else if media.contains("media massa") || media.contains("tulisan") {
            Some(Self::MassMedia(reach))
        } else {
            None
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Journal(1) => "NA1",
            Self::Journal(2) => "NA2",
            Self::Journal(3) => "NA3",
            Self::Journal(_) => "NA4",
            Self::Seminar(1) => "NB1",
            Self::Seminar(2) => "NB2",
            Self::Seminar(_) => "NB3",
            Self::MassMedia(1) => "NC1",
            Self::MassMedia(2) => "NC2",
            Self::MassMedia(_) => "NC3",
        }
    }
}

const KEYS: [&str; 10] = [
    "NA1", "NA2", "NA3", "NA4", "NB1", "NB2", "NB3", "NC1", "NC2", "NC3",
];

const RULES: &[ValidationRule] = &[ValidationRule::required(
    "media_publikasi",
    "Media publikasi wajib diisi",
)];

/// Tabel 3.b.4, faculty publications by venue. Butir 25.
///
/// Unlike research funding, publication ratios use the three-year totals directly:
/// `RL = (NA1+NB1+NC1)/NDTPS`, `RN = (NA2+NA3+NB2+NC2)/NDTPS`, `RI = (NA4+NB3+NC3)/NDTPS`.
pub struct PublicationPlugin {
    schema: TableSchema,
}

impl PublicationPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Publikasi Ilmiah DTPS",
                vec![
                    ColumnSpec::text("media_publikasi", "Media Publikasi", 1),
                    ColumnSpec::count("ts2", "Jumlah Judul TS-2", 2),
                    ColumnSpec::count("ts1", "Jumlah Judul TS-1", 3),
                    ColumnSpec::count("ts", "Jumlah Judul TS", 4),
                    ColumnSpec::count("jumlah", "Jumlah", 5),
                ],
            )
            .header_rows(2),
        }
    }
}

impl Default for PublicationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for PublicationPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3b4"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let mut warnings = Vec::new();
        let mut detail = detail_from(&KEYS.map(|key| (key, 0.0)));

        for record in self.countable(records) {
            let media = record.text("media_publikasi");
            match Venue::classify(&media) {
                Some(venue) => {
                    let key = venue.key();
                    detail.insert(key, detail.value(key) + yearly_total(record));
                }
                None => warnings.push(format!(
                    "row {}: publication venue '{}' not recognized; excluded from scoring",
                    record.sequence, media
                )),
            }
        }

        let sum = |keys: &[&str]| keys.iter().map(|key| detail.value(key)).sum::<f64>();
        let counts = TierCounts {
            international: sum(&["NA4", "NB3", "NC3"]),
            national: sum(&["NA2", "NA3", "NB2", "NC2"]),
            local: sum(&["NA1", "NB1", "NC1"]),
        };

        if counts.total() == 0.0 {
            for key in ["RI", "RN", "RL", "NDTPS"] {
                detail.insert(key, 0.0);
            }
            return ScoreOutcome::single(25, 0.0, detail).with_warnings(warnings);
        }

        let ndtps = faculty_headcount(ctx, &mut warnings).unwrap_or(0.0);
        detail.insert("NDTPS", ndtps);

        let ratios = TierRatios::from_counts(counts, 1.0, ndtps).unwrap_or_default();
        detail.insert("RI", ratios.international);
        detail.insert("RN", ratios.national);
        detail.insert("RL", ratios.local);

        let nilai = if ndtps > 0.0 {
            blend_score(ratios, config.publication)
        } else {
            0.0
        };
        ScoreOutcome::single(25, nilai, detail).with_warnings(warnings)
    }
}
