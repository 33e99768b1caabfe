use std::collections::BTreeSet;

use super::{detail_from, folded, FundedActivity};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

/// Faculty activity that students took part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisedActivity {
    /// Tabel 6.a, butir 43, against the research total of 3.b.2.
    Research,
    /// Tabel 7, butir 45, against the PkM total of 3.b.3.
    CommunityService,
}

impl SupervisedActivity {
    fn codes(self) -> &'static [&'static str] {
        match self {
            Self::Research => &["6a"],
            Self::CommunityService => &["7"],
        }
    }

    fn butir(self) -> u16 {
        match self {
            Self::Research => 43,
            Self::CommunityService => 45,
        }
    }

    fn source(self) -> (&'static str, FundedActivity) {
        match self {
            Self::Research => ("3b2", FundedActivity::Research),
            Self::CommunityService => ("3b3", FundedActivity::CommunityService),
        }
    }

    fn keys(self) -> (&'static str, &'static str) {
        match self {
            Self::Research => ("NPM", "PPDM"),
            Self::CommunityService => ("NPkMM", "PPkMDM"),
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Research => "Penelitian DTPS yang Melibatkan Mahasiswa",
            Self::CommunityService => "PkM DTPS yang Melibatkan Mahasiswa",
        }
    }
}

const RULES: &[ValidationRule] = &[
    ValidationRule::required("nama_dosen", "Nama dosen wajib diisi"),
    ValidationRule::required("nama_mahasiswa", "Nama mahasiswa wajib diisi"),
    ValidationRule::required("judul_kegiatan", "Judul kegiatan wajib diisi"),
];

/// Share of faculty research or PkM titles that involved students.
///
/// Several students on one activity are separate rows; titles are counted once.
pub struct StudentInvolvementPlugin {
    activity: SupervisedActivity,
    schema: TableSchema,
}

impl StudentInvolvementPlugin {
    pub fn new(activity: SupervisedActivity) -> Self {
        Self {
            activity,
            schema: TableSchema::new(
                activity.title(),
                vec![
                    ColumnSpec::text("nama_dosen", "Nama Dosen", 1),
                    ColumnSpec::text("tema_roadmap", "Tema Penelitian sesuai Roadmap", 2),
                    ColumnSpec::text("nama_mahasiswa", "Nama Mahasiswa", 3),
                    ColumnSpec::text("judul_kegiatan", "Judul Kegiatan", 4),
                    ColumnSpec::text("tahun", "Tahun", 5),
                ],
            )
            .with_selection(),
        }
    }

    pub fn research() -> Self {
        Self::new(SupervisedActivity::Research)
    }

    pub fn community_service() -> Self {
        Self::new(SupervisedActivity::CommunityService)
    }
}

impl TablePlugin for StudentInvolvementPlugin {
    fn codes(&self) -> &'static [&'static str] {
        self.activity.codes()
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
        let (count_key, ratio_key) = self.activity.keys();
        let (source_code, source_activity) = self.activity.source();
        let total_key = source_activity.total_key();
        let butir = self.activity.butir();

        let titles: BTreeSet<String> = self
            .countable(records)
            .into_iter()
            .map(|record| folded(&record.text("judul_kegiatan")))
            .collect();
        let involved = titles.len() as f64;

        if titles.is_empty() {
            return ScoreOutcome::single(
                butir,
                0.0,
                detail_from(&[(count_key, 0.0), (total_key, 0.0), (ratio_key, 0.0)]),
            );
        }

        let Some(source) = ctx.dependency(source_code) else {
            return ScoreOutcome::single(
                butir,
                0.0,
                detail_from(&[(count_key, involved), (total_key, 0.0), (ratio_key, 0.0)]),
            )
            .with_warning(format!(
                "table {source_code} has not been saved yet; {total_key} treated as 0"
            ));
        };

        let total = source.value(total_key);
        let (share, nilai) = config.student_involvement.score_ratio(involved, total);
        let mut outcome = ScoreOutcome::single(
            butir,
            nilai,
            detail_from(&[
                (count_key, involved),
                (total_key, total),
                (ratio_key, share.unwrap_or(0.0)),
            ]),
        );
        if involved > total && total > 0.0 {
            outcome = outcome.with_warning(format!(
                "{involved} titles involve students but table {source_code} lists only {total}"
            ));
        }
        outcome
    }
}
