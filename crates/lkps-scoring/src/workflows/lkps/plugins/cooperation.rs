use super::{detail_from, faculty_headcount};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::formulas::{finalize, ratio};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

/// Education, research and PkM cooperation tables.
const FAMILY: [&str; 3] = ["1-1", "1-2", "1-3"];

const RULES: &[ValidationRule] = &[
    ValidationRule::required("lembaga_mitra", "Lembaga mitra wajib diisi"),
    ValidationRule::required("judul_kegiatan", "Judul kegiatan kerjasama wajib diisi"),
    ValidationRule::required("bukti_kerjasama", "Bukti kerjasama wajib diisi"),
];

/// Tabel 1, tridharma cooperation agreements. Butir 5.
///
/// `RK = (3·N1 + 2·N2 + N3) / NDTPS` over all three parts, capped at 4. Each part stores
/// its own `N1..N3`; the combined totals are read from the siblings' saved details.
pub struct CooperationPlugin {
    schema: TableSchema,
}

impl CooperationPlugin {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::new(
                "Kerjasama Tridharma",
                vec![
                    ColumnSpec::text("lembaga_mitra", "Lembaga Mitra", 1),
                    ColumnSpec::flag("internasional", "Tingkat Internasional", 2),
                    ColumnSpec::flag("nasional", "Tingkat Nasional", 3),
                    ColumnSpec::flag("lokal", "Tingkat Wilayah/Lokal", 4),
                    ColumnSpec::text("judul_kegiatan", "Judul Kegiatan Kerjasama", 5),
                    ColumnSpec::text("manfaat", "Manfaat bagi PS yang Diakreditasi", 6),
                    ColumnSpec::text("waktu_durasi", "Waktu dan Durasi", 7),
                    ColumnSpec::text("bukti_kerjasama", "Bukti Kerjasama", 8),
                    ColumnSpec::text("tahun_berakhir", "Tahun Berakhirnya Kerjasama", 9),
                ],
            )
            .header_rows(2),
        }
    }
}

impl Default for CooperationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl TablePlugin for CooperationPlugin {
    fn codes(&self) -> &'static [&'static str] {
        &FAMILY
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn validation_rules(&self) -> &'static [ValidationRule] {
        RULES
    }

    fn calculate_score(
        &self,
        code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome {
        let mut own = [0.0_f64; 3];
        for record in self.countable(records) {
            // an agreement counts once, at its widest reach
            if record.flag("internasional") {
                own[0] += 1.0;
            } else if record.flag("nasional") {
                own[1] += 1.0;
            } else if record.flag("lokal") {
                own[2] += 1.0;
            }
        }

        let mut totals = own;
        for sibling in FAMILY.iter().filter(|member| **member != code.as_str()) {
            if let Some(detail) = ctx.optional(sibling) {
                totals[0] += detail.value("N1");
                totals[1] += detail.value("N2");
                totals[2] += detail.value("N3");
            }
        }

        let mut detail = detail_from(&[
            ("N1", own[0]),
            ("N2", own[1]),
            ("N3", own[2]),
            ("TOTAL_N1", totals[0]),
            ("TOTAL_N2", totals[1]),
            ("TOTAL_N3", totals[2]),
        ]);

        let weights = config.cooperation;
        let weighted =
            weights.international * totals[0] + weights.national * totals[1] + weights.local * totals[2];

        if weighted == 0.0 {
            detail.insert("NDTPS", 0.0);
            detail.insert("RK", 0.0);
            return ScoreOutcome::single(5, 0.0, detail);
        }

        let mut warnings = Vec::new();
        let ndtps = faculty_headcount(ctx, &mut warnings).unwrap_or(0.0);
        let rk = ratio(weighted, ndtps);
        detail.insert("NDTPS", ndtps);
        detail.insert("RK", rk.unwrap_or(0.0));

        ScoreOutcome::single(5, rk.map(finalize).unwrap_or(0.0), detail).with_warnings(warnings)
    }
}
