//! Scoring curves shared by the table plugins.
//!
//! Every score leaves this module clamped to `[0, MAX_SCORE]` and rounded half-up to two
//! decimals.

use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 4.0;

/// Round half-up to two decimals.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // absorbs representation error such as 2.675 * 100 = 267.49999
    (scaled + 0.5 + 1e-9).floor() / 100.0
}

pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_SCORE)
    } else {
        0.0
    }
}

pub fn finalize(value: f64) -> f64 {
    round2(clamp_score(value))
}

/// `numerator / denominator`, or `None` when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 && denominator.is_finite() {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// Achievement thresholds for the international, national and local tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendFactors {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl BlendFactors {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }
}

/// Per-DTPS ratios for the three tiers (`RI`, `RN`, `RL`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TierRatios {
    pub international: f64,
    pub national: f64,
    pub local: f64,
}

impl TierRatios {
    /// Tier counts spread over `years` and divided by the DTPS headcount.
    /// `None` when either divisor is zero.
    pub fn from_counts(counts: TierCounts, years: f64, ndtps: f64) -> Option<Self> {
        let divisor = years * ndtps;
        Some(Self {
            international: ratio(counts.international, divisor)?,
            national: ratio(counts.national, divisor)?,
            local: ratio(counts.local, divisor)?,
        })
    }
}

/// Raw tier totals (`NI`, `NN`, `NL`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TierCounts {
    pub international: f64,
    pub national: f64,
    pub local: f64,
}

impl TierCounts {
    pub fn total(&self) -> f64 {
        self.international + self.national + self.local
    }
}

/// Three-tier inclusion-exclusion blend.
///
/// Full marks when both `RI >= a` and `RN >= b`; otherwise
/// `4 × (A + B + C/2 − AB − AC/2 − BC/2 + ABC/2)` with `A = RI/a`, `B = RN/b`, `C = RL/c`.
pub fn blend_score(ratios: TierRatios, factors: BlendFactors) -> f64 {
    if ratios.international >= factors.a && ratios.national >= factors.b {
        return MAX_SCORE;
    }

    let a = ratio(ratios.international, factors.a).unwrap_or(0.0);
    let b = ratio(ratios.national, factors.b).unwrap_or(0.0);
    let c = ratio(ratios.local, factors.c).unwrap_or(0.0);

    let blended = a + b + c / 2.0 - a * b - (a * c) / 2.0 - (b * c) / 2.0 + (a * b * c) / 2.0;
    finalize(MAX_SCORE * blended)
}

/// `4` once the ratio reaches `cutoff`, otherwise `floor + slope × ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdLinear {
    pub cutoff: f64,
    pub floor: f64,
    pub slope: f64,
}

impl ThresholdLinear {
    pub const fn new(cutoff: f64, floor: f64, slope: f64) -> Self {
        Self {
            cutoff,
            floor,
            slope,
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        if value >= self.cutoff {
            MAX_SCORE
        } else {
            finalize(self.floor + self.slope * value.max(0.0))
        }
    }

    /// Scores `numerator / denominator`; a zero denominator scores 0.
    pub fn score_ratio(&self, numerator: f64, denominator: f64) -> (Option<f64>, f64) {
        match ratio(numerator, denominator) {
            Some(value) => (Some(value), self.score(value)),
            None => (None, 0.0),
        }
    }
}

/// Faculty headcount band: 4 at 12 or more DTPS, linear from 3, 0 below.
pub fn headcount_score(ndtps: f64) -> f64 {
    if ndtps >= 12.0 {
        MAX_SCORE
    } else if ndtps >= 3.0 {
        finalize((2.0 * ndtps + 12.0) / 9.0)
    } else {
        0.0
    }
}

/// Workload window centred on 14 SKS per semester, 0 outside 12..=16.
pub fn workload_score(ewmp: f64) -> f64 {
    if (ewmp - 14.0).abs() < f64::EPSILON {
        MAX_SCORE
    } else if (12.0..14.0).contains(&ewmp) {
        finalize(3.0 + (ewmp - 12.0) / 2.0)
    } else if ewmp > 14.0 && ewmp <= 16.0 {
        finalize(3.0 + (16.0 - ewmp) / 2.0)
    } else {
        0.0
    }
}

/// Share of non-permanent lecturers: 4 up to 10%, linear to 40%, then 0.
pub fn adjunct_share_score(share: f64) -> f64 {
    if share <= 0.1 {
        MAX_SCORE
    } else if share <= 0.4 {
        finalize((14.0 - 20.0 * share) / 3.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESEARCH: BlendFactors = BlendFactors::new(0.05, 0.3, 1.0);

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(3.444), 3.44);
        assert_eq!(round2(3.445), 3.45);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn finalize_clamps_to_range() {
        assert_eq!(finalize(5.2), 4.0);
        assert_eq!(finalize(-1.0), 0.0);
        assert_eq!(finalize(f64::NAN), 0.0);
        assert_eq!(finalize(f64::INFINITY), 0.0);
    }

    #[test]
    fn ratio_rejects_zero_denominator() {
        assert_eq!(ratio(5.0, 0.0), None);
        assert_eq!(ratio(5.0, -1.0), None);
        assert_eq!(ratio(5.0, 10.0), Some(0.5));
    }

    #[test]
    fn blend_gives_full_marks_when_international_and_national_clear() {
        let ratios = TierRatios {
            international: 0.05,
            national: 0.3,
            local: 0.0,
        };
        assert_eq!(blend_score(ratios, RESEARCH), 4.0);
    }

    #[test]
    fn blend_is_zero_without_activity() {
        assert_eq!(blend_score(TierRatios::default(), RESEARCH), 0.0);
    }

    #[test]
    fn blend_overshoot_is_clamped() {
        // RL = 6/3/10, RI = 2/3/10, RN = 0 -> 4 × 1.3 = 5.2 before clamping
        let counts = TierCounts {
            international: 2.0,
            national: 0.0,
            local: 6.0,
        };
        let ratios = TierRatios::from_counts(counts, 3.0, 10.0).expect("ratios");
        assert!((ratios.local - 0.2).abs() < 1e-12);
        assert!((ratios.international - 2.0 / 30.0).abs() < 1e-12);
        assert_eq!(ratios.national, 0.0);
        assert_eq!(blend_score(ratios, RESEARCH), 4.0);
    }

    #[test]
    fn blend_partial_activity_matches_closed_form() {
        let ratios = TierRatios {
            international: 0.01,
            national: 0.15,
            local: 0.5,
        };
        // A = 0.2, B = 0.5, C = 0.5
        // 0.2 + 0.5 + 0.25 - 0.1 - 0.05 - 0.125 + 0.025 = 0.7 -> 2.8
        assert_eq!(blend_score(ratios, RESEARCH), 2.8);
    }

    #[test]
    fn blend_local_only() {
        let ratios = TierRatios {
            international: 0.0,
            national: 0.0,
            local: 0.2,
        };
        // C = 0.2 -> 4 × 0.1 = 0.4
        assert_eq!(blend_score(ratios, RESEARCH), 0.4);
    }

    #[test]
    fn tier_ratios_require_positive_divisor() {
        assert!(TierRatios::from_counts(TierCounts::default(), 3.0, 0.0).is_none());
        assert!(TierRatios::from_counts(TierCounts::default(), 0.0, 10.0).is_none());
    }

    #[test]
    fn threshold_linear_floor_and_cutoff() {
        let curve = ThresholdLinear::new(0.5, 2.0, 4.0);
        assert_eq!(curve.score(0.0), 2.0);
        assert_eq!(curve.score(0.25), 3.0);
        assert_eq!(curve.score(0.5), 4.0);
        assert_eq!(curve.score(3.0), 4.0);
    }

    #[test]
    fn threshold_linear_zero_denominator_scores_zero() {
        let curve = ThresholdLinear::new(0.25, 2.0, 8.0);
        assert_eq!(curve.score_ratio(4.0, 0.0), (None, 0.0));
        let (value, score) = curve.score_ratio(1.0, 10.0);
        assert_eq!(value, Some(0.1));
        assert_eq!(score, 2.8);
    }

    #[test]
    fn threshold_linear_never_exceeds_max_below_cutoff() {
        let steep = ThresholdLinear::new(1.0, 2.0, 10.0);
        assert_eq!(steep.score(0.9), 4.0);
    }

    #[test]
    fn headcount_band() {
        assert_eq!(headcount_score(2.0), 0.0);
        assert_eq!(headcount_score(3.0), 2.0);
        assert_eq!(headcount_score(6.0), 2.67);
        assert_eq!(headcount_score(12.0), 4.0);
    }

    #[test]
    fn workload_window() {
        assert_eq!(workload_score(14.0), 4.0);
        assert_eq!(workload_score(12.0), 3.0);
        assert_eq!(workload_score(13.0), 3.5);
        assert_eq!(workload_score(15.0), 3.5);
        assert_eq!(workload_score(16.0), 3.0);
        assert_eq!(workload_score(11.9), 0.0);
        assert_eq!(workload_score(16.5), 0.0);
    }

    #[test]
    fn adjunct_share_curve() {
        assert_eq!(adjunct_share_score(0.0), 4.0);
        assert_eq!(adjunct_share_score(0.1), 4.0);
        assert_eq!(adjunct_share_score(0.25), 3.0);
        assert_eq!(adjunct_share_score(0.4), 2.0);
        assert_eq!(adjunct_share_score(0.41), 0.0);
    }
}
