use super::formulas::{BlendFactors, ThresholdLinear};
use serde::{Deserialize, Serialize};

/// Weights applied to cooperation agreements by reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooperationWeights {
    pub international: f64,
    pub national: f64,
    pub local: f64,
}

/// Formula constants for every scored table. Defaults follow the BAN-PT sarjana matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of assessment years (TS-2, TS-1, TS) averaged by the blend ratios.
    pub assessment_years: u8,
    pub cooperation: CooperationWeights,
    pub doctoral_share: ThresholdLinear,
    pub senior_rank_share: ThresholdLinear,
    pub recognition: ThresholdLinear,
    pub research: BlendFactors,
    pub community_service: BlendFactors,
    pub publication: BlendFactors,
    pub citation: ThresholdLinear,
    pub faculty_output: ThresholdLinear,
    pub student_involvement: ThresholdLinear,
    pub student_output: ThresholdLinear,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            assessment_years: 3,
            cooperation: CooperationWeights {
                international: 3.0,
                national: 2.0,
                local: 1.0,
            },
            doctoral_share: ThresholdLinear::new(0.5, 2.0, 4.0),
            senior_rank_share: ThresholdLinear::new(0.7, 2.0, 20.0 / 7.0),
            recognition: ThresholdLinear::new(0.5, 2.0, 4.0),
            research: BlendFactors::new(0.05, 0.3, 1.0),
            community_service: BlendFactors::new(0.05, 0.3, 1.0),
            publication: BlendFactors::new(0.1, 1.0, 2.0),
            citation: ThresholdLinear::new(0.5, 2.0, 4.0),
            faculty_output: ThresholdLinear::new(1.0, 2.0, 2.0),
            student_involvement: ThresholdLinear::new(0.25, 2.0, 8.0),
            student_output: ThresholdLinear::new(1.0, 2.0, 2.0),
        }
    }
}

impl ScoringConfig {
    pub fn years(&self) -> f64 {
        f64::from(self.assessment_years.max(1))
    }
}
