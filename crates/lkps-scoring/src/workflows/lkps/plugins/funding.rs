use super::{detail_from, faculty_headcount, folded, yearly_total};
use crate::workflows::lkps::config::ScoringConfig;
use crate::workflows::lkps::domain::{ScoreOutcome, TableCode, TableRecord};
use crate::workflows::lkps::formulas::{blend_score, BlendFactors, TierCounts, TierRatios};
use crate::workflows::lkps::plugin::{
    ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule,
};

/// Faculty activity whose titles are tallied by funding source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundedActivity {
    /// Tabel 3.b.2, butir 23.
    Research,
    /// Tabel 3.b.3, butir 24.
    CommunityService,
}

impl FundedActivity {
    fn code(self) -> &'static [&'static str] {
        match self {
            Self::Research => &["3b2"],
            Self::CommunityService => &["3b3"],
        }
    }

    fn butir(self) -> u16 {
        match self {
            Self::Research => 23,
            Self::CommunityService => 24,
        }
    }

    /// Detail key carrying the activity total, read by the student-involvement tables.
    pub fn total_key(self) -> &'static str {
        match self {
            Self::Research => "NPD",
            Self::CommunityService => "NPkMD",
        }
    }

    fn factors(self, config: &ScoringConfig) -> BlendFactors {
        match self {
            Self::Research => config.research,
            Self::CommunityService => config.community_service,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Research => "Penelitian DTPS",
            Self::CommunityService => "Pengabdian kepada Masyarakat (PkM) DTPS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FundingTier {
    International,
    National,
    Local,
}

impl FundingTier {
    fn classify(source: &str) -> Option<Self> {
        let source = folded(source);
        if source.contains("luar negeri") || source.contains("internasional") {
            Some(Self::International)
        } else if source.contains("dalam negeri") || source.contains("nasional") {
            Some(Self::National)
        } else if source.contains("perguruan tinggi") || source.contains("mandiri") {
            Some(Self::Local)
        } else {
            None
        }
    }
}

const RULES: &[ValidationRule] = &[ValidationRule::required(
    "sumber_pembiayaan",
    "Sumber pembiayaan wajib diisi",
)];

/// Research or PkM titles by funding source, scored with the three-tier blend.
pub struct FundedActivityPlugin {
    activity: FundedActivity,
    schema: TableSchema,
}

impl FundedActivityPlugin {
    pub fn new(activity: FundedActivity) -> Self {
        Self {
            activity,
            schema: TableSchema::new(
                activity.title(),
                vec![
                    ColumnSpec::text("sumber_pembiayaan", "Sumber Pembiayaan", 1),
                    ColumnSpec::count("ts2", "Jumlah Judul TS-2", 2),
                    ColumnSpec::count("ts1", "Jumlah Judul TS-1", 3),
                    ColumnSpec::count("ts", "Jumlah Judul TS", 4),
                    ColumnSpec::count("jumlah", "Jumlah", 5),
                ],
            )
            .header_rows(2),
        }
    }

    pub fn research() -> Self {
        Self::new(FundedActivity::Research)
    }

    pub fn community_service() -> Self {
        Self::new(FundedActivity::CommunityService)
    }
}

impl TablePlugin for FundedActivityPlugin {
    fn codes(&self) -> &'static [&'static str] {
        self.activity.code()
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
        let mut counts = TierCounts::default();

        for record in self.countable(records) {
            let source = record.text("sumber_pembiayaan");
            let total = yearly_total(record);
            match FundingTier::classify(&source) {
                Some(FundingTier::International) => counts.international += total,
                Some(FundingTier::National) => counts.national += total,
                Some(FundingTier::Local) => counts.local += total,
                None => warnings.push(format!(
                    "row {}: funding source '{}' not recognized; excluded from scoring",
                    record.sequence, source
                )),
            }
        }

        let total_key = self.activity.total_key();
        let butir = self.activity.butir();
        let mut detail = detail_from(&[
            ("NI", counts.international),
            ("NN", counts.national),
            ("NL", counts.local),
            (total_key, counts.total()),
        ]);

        if counts.total() == 0.0 {
            for key in ["RI", "RN", "RL", "NDTPS"] {
                detail.insert(key, 0.0);
            }
            return ScoreOutcome::single(butir, 0.0, detail).with_warnings(warnings);
        }

        let ndtps = faculty_headcount(ctx, &mut warnings).unwrap_or(0.0);
        detail.insert("NDTPS", ndtps);

        let Some(ratios) = TierRatios::from_counts(counts, config.years(), ndtps) else {
            for key in ["RI", "RN", "RL"] {
                detail.insert(key, 0.0);
            }
            return ScoreOutcome::single(butir, 0.0, detail).with_warnings(warnings);
        };

        detail.insert("RI", ratios.international);
        detail.insert("RN", ratios.national);
        detail.insert("RL", ratios.local);

        let nilai = blend_score(ratios, self.activity.factors(config));
        ScoreOutcome::single(butir, nilai, detail).with_warnings(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funding_sources_are_classified() {
        assert_eq!(
            FundingTier::classify("Perguruan Tinggi (Mandiri)"),
            Some(FundingTier::Local)
        );
        assert_eq!(
            FundingTier::classify("Lembaga dalam negeri (diluar PT)"),
            Some(FundingTier::National)
        );
        assert_eq!(
            FundingTier::classify("Lembaga luar negeri"),
            Some(FundingTier::International)
        );
        assert_eq!(FundingTier::classify("Hibah lain"), None);
    }
}
