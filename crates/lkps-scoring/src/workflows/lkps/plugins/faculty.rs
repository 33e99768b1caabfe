use super::{detail_from, folded, FACULTY_TABLE};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreEntry, ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::formulas::{adjunct_share_score, headcount_score, ratio, workload_score};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcademicRank {
    GuruBesar,
    LektorKepala,
    Lektor,
    AsistenAhli,
    Other,
}

impl AcademicRank {
    fn parse(raw: &str) -> Self {
        let value = folded(raw);
        if value.contains("guru besar") || value.starts_with("prof") {
            Self::GuruBesar
        } else if value.starts_with("lektor kepala") {
            Self::LektorKepala
        } else if value.starts_with("lektor") {
            Self::Lektor
        } else if value.starts_with("asisten ahli") {
            Self::AsistenAhli
        } else {
            Self::Other
        }
    }
}

const PERMANENT_RULES: &[ValidationRule] = &[
    ValidationRule::required("nama_dosen", "Nama dosen wajib diisi"),
    ValidationRule::required("nidn", "NIDN/NIDK wajib diisi"),
    ValidationRule::required("jabatan_akademik", "Jabatan akademik wajib diisi"),
];

/// Tabel 3.a.1, permanent faculty roster. Scores butir 15–17 and publishes `NDTPS`.
pub struct PermanentFacultyPlugin {
    schema: TableSchema,
}

impl PermanentFacultyPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Dosen Tetap Perguruan Tinggi",
                vec![
                    ColumnSpec::text("nama_dosen", "Nama Dosen", 1),
                    ColumnSpec::text("nidn", "NIDN/NIDK", 2),
                    ColumnSpec::text("pendidikan_magister", "Pendidikan Magister/Magister Terapan/Spesialis", 3),
                    ColumnSpec::text("pendidikan_doktor", "Pendidikan Doktor/Doktor Terapan/Spesialis", 4),
                    ColumnSpec::text("bidang_keahlian", "Bidang Keahlian", 5),
                    ColumnSpec::flag("sesuai_kompetensi", "Kesesuaian dengan Kompetensi Inti PS", 6),
                    ColumnSpec::text("jabatan_akademik", "Jabatan Akademik", 7),
                    ColumnSpec::text("sertifikat_pendidik", "Sertifikat Pendidik Profesional", 8),
                    ColumnSpec::text("sertifikat_kompetensi", "Sertifikat Kompetensi/Profesi/Industri", 9),
                    ColumnSpec::text("mata_kuliah_ps", "Mata Kuliah yang Diampu pada PS", 10),
                    ColumnSpec::flag("sesuai_mata_kuliah", "Kesesuaian Bidang Keahlian dengan Mata Kuliah", 11),
                    ColumnSpec::text("mata_kuliah_ps_lain", "Mata Kuliah yang Diampu pada PS Lain", 12),
                ],
            )
            .header_rows(2),
        }
    }
}

impl Default for PermanentFacultyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for PermanentFacultyPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3a1"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        PERMANENT_RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        _ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let rows = self.countable(records);
        let dtps: Vec<&TableRecord> = rows
            .iter()
            .copied()
            .filter(|record| record.flag("sesuai_kompetensi"))
            .collect();

        let ndt = rows.len() as f64;
        let ndtps = dtps.len() as f64;
        let nds3 = dtps
            .iter()
            .filter(|record| !record.is_blank("pendidikan_doktor"))
            .count() as f64;
        let ndsp = dtps
            .iter()
            .filter(|record| !record.is_blank("sertifikat_pendidik"))
            .count() as f64;

        let rank_count = |rank: AcademicRank| {
            dtps.iter()
                .filter(|record| AcademicRank::parse(&record.text("jabatan_akademik")) == rank)
                .count() as f64
        };
        let ndgb = rank_count(AcademicRank::GuruBesar);
        let ndlk = rank_count(AcademicRank::LektorKepala);
        let ndl = rank_count(AcademicRank::Lektor);
        let ndaa = rank_count(AcademicRank::AsistenAhli);

        let (pds3, doctoral) = config.doctoral_share.score_ratio(nds3, ndtps);
        let (pgblkl, senior) = config
            .senior_rank_share
            .score_ratio(ndgb + ndlk + ndl, ndtps);

        ScoreOutcome {
            scores: vec![
                ScoreEntry {
                    butir: 15,
                    nilai: headcount_score(ndtps),
                },
                ScoreEntry {
                    butir: 16,
                    nilai: doctoral,
                },
                ScoreEntry {
                    butir: 17,
                    nilai: senior,
                },
            ],
            score_detail: detail_from(&[
                ("NDT", ndt),
                ("NDTPS", ndtps),
                ("NDS3", nds3),
                ("NDSP", ndsp),
                ("NDGB", ndgb),
                ("NDLK", ndlk),
                ("NDL", ndl),
                ("NDAA", ndaa),
                ("PDS3", pds3.unwrap_or(0.0)),
                ("PGBLKL", pgblkl.unwrap_or(0.0)),
            ]),
            warnings: Vec::new(),
        }
    }
}

const WORKLOAD_RULES: &[ValidationRule] =
    &[ValidationRule::required("nama_dosen", "Nama dosen wajib diisi")];

const WORKLOAD_COLUMNS: [&str; 6] = [
    "pendidikan_ps",
    "pendidikan_ps_lain",
    "pendidikan_luar_pt",
    "penelitian",
    "pkm",
    "tugas_tambahan",
];

/// Tabel 3.a.3, equivalent teaching load (EWMP) per DTPS per semester. Butir 20.
pub struct WorkloadPlugin {
    schema: TableSchema,
}

impl WorkloadPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Ekuivalen Waktu Mengajar Penuh (EWMP) Dosen Tetap",
                vec![
                    ColumnSpec::text("nama_dosen", "Nama Dosen (DT)", 1),
                    ColumnSpec::flag("dtps", "DTPS", 2),
                    ColumnSpec::count("pendidikan_ps", "Pendidikan: PS yang Diakreditasi", 3),
                    ColumnSpec::count("pendidikan_ps_lain", "Pendidikan: PS Lain di dalam PT", 4),
                    ColumnSpec::count("pendidikan_luar_pt", "Pendidikan: PS Lain di luar PT", 5),
                    ColumnSpec::count("penelitian", "Penelitian", 6),
                    ColumnSpec::count("pkm", "PkM", 7),
                    ColumnSpec::count("tugas_tambahan", "Tugas Tambahan dan/atau Penunjang", 8),
                ],
            )
            .header_rows(3),
        }
    }
}

impl Default for WorkloadPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for WorkloadPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3a3"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        WORKLOAD_RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        _config: &ScoringConfig,
        _ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let loads: Vec<f64> = self
            .countable(records)
            .into_iter()
            .filter(|record| record.flag("dtps"))
            .map(|record| {
                WORKLOAD_COLUMNS
                    .iter()
                    .map(|column| record.number(column))
                    .sum::<f64>()
            })
            .collect();

        let count = loads.len() as f64;
        let ewmp = ratio(loads.iter().sum(), count);
        let nilai = ewmp.map(workload_score).unwrap_or(0.0);

        ScoreOutcome::single(
            20,
            nilai,
            detail_from(&[("NDTPS", count), ("EWMP", ewmp.unwrap_or(0.0))]),
        )
    }
}

const ADJUNCT_RULES: &[ValidationRule] = &[
    ValidationRule::required("nama_dosen", "Nama dosen wajib diisi"),
    ValidationRule::required("nidn", "NIDN/NIDK wajib diisi"),
];

/// Tabel 3.a.4, non-permanent lecturers. Butir 21, relative to the permanent roster.
pub struct AdjunctFacultyPlugin {
    schema: TableSchema,
}

impl AdjunctFacultyPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Dosen Tidak Tetap",
                vec![
                    ColumnSpec::text("nama_dosen", "Nama Dosen", 1),
                    ColumnSpec::text("nidn", "NIDN/NIDK", 2),
                    ColumnSpec::text("pendidikan_pasca_sarjana", "Pendidikan Pasca Sarjana", 3),
                    ColumnSpec::text("bidang_keahlian", "Bidang Keahlian", 4),
                    ColumnSpec::text("jabatan_akademik", "Jabatan Akademik", 5),
                    ColumnSpec::text("sertifikat_pendidik", "Sertifikat Pendidik Profesional", 6),
                    ColumnSpec::text("sertifikat_kompetensi", "Sertifikat Kompetensi/Profesi/Industri", 7),
                    ColumnSpec::text("mata_kuliah_ps", "Mata Kuliah yang Diampu pada PS", 8),
                    ColumnSpec::flag("sesuai_mata_kuliah", "Kesesuaian Bidang Keahlian dengan Mata Kuliah", 9),
                ],
            ),
        }
    }
}

impl Default for AdjunctFacultyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for AdjunctFacultyPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &["3a4"]
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        ADJUNCT_RULES
    }

    fn calculate_score(
        &self,
        _code: &TableCode,
        records: &[TableRecord],
        _config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let ndtt = self.countable(records).len() as f64;
        if ndtt == 0.0 {
            return ScoreOutcome::single(21, 0.0, detail_from(&[("NDTT", 0.0), ("NDT", 0.0)]));
        }

        let Some(roster) = ctx.dependency(FACULTY_TABLE) else {
            return ScoreOutcome::single(
                21,
                0.0,
                detail_from(&[("NDTT", ndtt), ("NDT", 0.0), ("PDTT", 0.0)]),
            )
            .with_warning(format!(
                "table {FACULTY_TABLE} has not been saved yet; NDT treated as 0"
            ));
        };

        let ndt = roster.value("NDT");
        let pdtt = ratio(ndtt, ndt + ndtt).unwrap_or(0.0);

        ScoreOutcome::single(
            21,
            adjunct_share_score(pdtt),
            detail_from(&[("NDTT", ndtt), ("NDT", ndt), ("PDTT", pdtt)]),
        )
    }
}
