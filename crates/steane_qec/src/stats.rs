//! Shot statistics and power-law fitting
//!
//! Gantree: L5_Qec → StatisticsEngine
//!
//! Accumulators are plain counters so partial results from parallel
//! workers merge by addition. Ratios with an empty denominator come back
//! as `Estimate::Undefined` instead of NaN.

use crate::config::PostSelection;
use crate::scheduler::ShotTrace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use steane_core::types::Bitstring;
use steane_core::constants::stats::MIN_FIT_POINTS;
use steane_core::error::{SteaneError, SteaneResult};

// ============================================================================
// Estimate
// ============================================================================

/// A ratio that may be undefined
/// Gantree: Estimate // 추정값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimate {
    /// Finite value
    Defined(f64),
    /// No usable denominator
    Undefined {
        /// What was missing
        reason: String,
    },
}

impl Estimate {
    /// `num / den`, undefined when `den == 0`
    pub fn ratio(num: u64, den: u64, what: &str) -> Self {
        if den == 0 {
            Estimate::Undefined {
                reason: format!("no {}", what),
            }
        } else {
            Estimate::Defined(num as f64 / den as f64)
        }
    }

    /// Value if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Defined(v) => Some(*v),
            Estimate::Undefined { .. } => None,
        }
    }

    /// Check if defined
    pub fn is_defined(&self) -> bool {
        matches!(self, Estimate::Defined(_))
    }

    /// Apply `f` to a defined value
    pub fn map(&self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Estimate::Defined(v) => Estimate::Defined(f(*v)),
            undefined => undefined.clone(),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimate::Defined(v) => write!(f, "{:.4}", v),
            Estimate::Undefined { reason } => write!(f, "undefined ({})", reason),
        }
    }
}

/// Binomial standard error of a proportion over `n` trials
pub fn binomial_standard_error(p: f64, n: u64) -> Estimate {
    if n == 0 {
        return Estimate::Undefined {
            reason: "no trials".to_string(),
        };
    }
    Estimate::Defined((p * (1.0 - p) / n as f64).max(0.0).sqrt())
}

// ============================================================================
// Readout Patterns
// ============================================================================

/// Mergeable histogram of corrected readout strings
/// Gantree: PatternHistogram // 패턴 분포
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternHistogram {
    counts: BTreeMap<String, u64>,
}

impl PatternHistogram {
    /// Count one readout
    pub fn record(&mut self, readout: &Bitstring) {
        *self.counts.entry(readout.to_string()).or_insert(0) += 1;
    }

    /// Sum of two partial histograms
    pub fn merge(mut self, other: Self) -> Self {
        for (pattern, n) in other.counts {
            *self.counts.entry(pattern).or_insert(0) += n;
        }
        self
    }

    /// Occurrences of `pattern`
    pub fn count(&self, pattern: &str) -> u64 {
        self.counts.get(pattern).copied().unwrap_or(0)
    }

    /// Readouts counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Distinct readouts seen
    /// Gantree: unique_patterns() -> usize // 고유 패턴 수
    pub fn unique_patterns(&self) -> usize {
        self.counts.len()
    }

    /// The `k` most frequent readouts, ties broken by pattern order
    /// Gantree: most_common(k) -> Vec<(String, u64)> // 상위 패턴
    pub fn most_common(&self, k: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> =
            self.counts.iter().map(|(p, &n)| (p.clone(), n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }

    /// Total variation distance between the two empirical distributions
    pub fn total_variation(&self, other: &Self) -> Estimate {
        let (n, m) = (self.total(), other.total());
        if n == 0 || m == 0 {
            return Estimate::Undefined {
                reason: "empty histogram".to_string(),
            };
        }
        let mut keys: Vec<&String> = self.counts.keys().chain(other.counts.keys()).collect();
        keys.sort();
        keys.dedup();
        let distance: f64 = keys
            .into_iter()
            .map(|k| (self.count(k) as f64 / n as f64 - other.count(k) as f64 / m as f64).abs())
            .sum();
        Estimate::Defined(distance / 2.0)
    }
}

// ============================================================================
// Shot Statistics
// ============================================================================

/// Mergeable campaign counters
/// Gantree: ShotStatistics // 샷 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotStatistics {
    /// Shots seen
    pub shots: u64,

    /// Shots whose readout lies in the target sector
    pub in_sector: u64,

    /// Shots whose decoded logical value is the target
    pub decoded_ok: u64,

    /// Shots kept by the post-selection predicate
    pub retained: u64,

    /// Retained shots in the target sector
    pub retained_in_sector: u64,

    /// Retained shots decoded to the target
    pub retained_decoded_ok: u64,

    /// Shots with at least one flagged round
    pub flagged_shots: u64,

    /// Rounds seen
    pub rounds: u64,

    /// Rounds with a non-trivial measured syndrome
    pub nontrivial_rounds: u64,

    /// Rounds that ended flagged
    pub flagged_rounds: u64,

    /// Corrected readout histogram
    pub patterns: PatternHistogram,
}

impl ShotStatistics {
    /// Count one shot
    /// Gantree: record(trace, predicate) // 누적
    pub fn record(&mut self, trace: &ShotTrace, predicate: PostSelection) {
        self.shots += 1;
        self.in_sector += trace.in_target_sector as u64;
        self.decoded_ok += trace.decoded_ok() as u64;
        self.flagged_shots += trace.is_flagged() as u64;
        self.rounds += trace.rounds.len() as u64;
        self.nontrivial_rounds += trace.nontrivial_rounds() as u64;
        self.flagged_rounds += trace.flagged_rounds() as u64;
        self.patterns.record(&trace.readout);

        if trace.passes(predicate) {
            self.retained += 1;
            self.retained_in_sector += trace.in_target_sector as u64;
            self.retained_decoded_ok += trace.decoded_ok() as u64;
        }
    }

    /// Sum of two partial accumulators
    pub fn merge(mut self, other: Self) -> Self {
        self.shots += other.shots;
        self.in_sector += other.in_sector;
        self.decoded_ok += other.decoded_ok;
        self.retained += other.retained;
        self.retained_in_sector += other.retained_in_sector;
        self.retained_decoded_ok += other.retained_decoded_ok;
        self.flagged_shots += other.flagged_shots;
        self.rounds += other.rounds;
        self.nontrivial_rounds += other.nontrivial_rounds;
        self.flagged_rounds += other.flagged_rounds;
        self.patterns = self.patterns.merge(other.patterns);
        self
    }

    // ========================================================================
    // Fidelities
    // ========================================================================

    /// Fraction of readouts inside the target codeword sector
    pub fn raw_fidelity(&self) -> Estimate {
        Estimate::ratio(self.in_sector, self.shots, "shots")
    }

    /// Fraction of shots decoded to the target logical value
    pub fn decoded_fidelity(&self) -> Estimate {
        Estimate::ratio(self.decoded_ok, self.shots, "shots")
    }

    /// 1 - decoded fidelity
    pub fn logical_error_rate(&self) -> Estimate {
        self.decoded_fidelity().map(|f| 1.0 - f)
    }

    /// Standard error of the raw fidelity
    pub fn raw_standard_error(&self) -> Estimate {
        match self.raw_fidelity().value() {
            Some(p) => binomial_standard_error(p, self.shots),
            None => self.raw_fidelity(),
        }
    }

    /// Standard error of the decoded fidelity
    pub fn decoded_standard_error(&self) -> Estimate {
        match self.decoded_fidelity().value() {
            Some(p) => binomial_standard_error(p, self.shots),
            None => self.decoded_fidelity(),
        }
    }

    // ========================================================================
    // Per-Round
    // ========================================================================

    /// Fraction of rounds with a non-trivial syndrome
    pub fn nontrivial_round_fraction(&self) -> Estimate {
        Estimate::ratio(self.nontrivial_rounds, self.rounds, "rounds")
    }

    /// Fraction of rounds that were flagged
    pub fn flagged_round_fraction(&self) -> Estimate {
        Estimate::ratio(self.flagged_rounds, self.rounds, "rounds")
    }

    /// Post-selection summary
    pub fn post_selection(&self, predicate: PostSelection) -> PostSelectionReport {
        let yield_fraction = Estimate::ratio(self.retained, self.shots, "shots");
        let conditional_fidelity =
            Estimate::ratio(self.retained_in_sector, self.retained, "retained shots");
        let conditional_decoded_fidelity =
            Estimate::ratio(self.retained_decoded_ok, self.retained, "retained shots");
        let effective_fidelity = match (yield_fraction.value(), conditional_fidelity.value()) {
            (Some(y), Some(f)) => Estimate::Defined(y * f),
            _ => Estimate::Undefined {
                reason: "no retained shots".to_string(),
            },
        };

        PostSelectionReport {
            predicate,
            retained: self.retained,
            total: self.shots,
            yield_fraction,
            conditional_fidelity,
            conditional_decoded_fidelity,
            effective_fidelity,
        }
    }
}

/// Post-selection outcome
/// Gantree: PostSelectionReport // 사후 선택 보고
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSelectionReport {
    /// Predicate applied
    pub predicate: PostSelection,

    /// Shots kept
    pub retained: u64,

    /// Shots seen
    pub total: u64,

    /// retained / total
    pub yield_fraction: Estimate,

    /// Raw fidelity among retained shots
    pub conditional_fidelity: Estimate,

    /// Decoded fidelity among retained shots
    pub conditional_decoded_fidelity: Estimate,

    /// yield × conditional fidelity
    pub effective_fidelity: Estimate,
}

impl fmt::Display for PostSelectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: kept {}/{} (yield {}), fidelity {}",
            self.predicate, self.retained, self.total, self.yield_fraction, self.conditional_fidelity
        )
    }
}

// ============================================================================
// Power-Law Fit
// ============================================================================

/// Scaling regime of a fitted exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// β > 1: logical errors shrink faster than physical ones
    Suppression,
    /// β ≤ 1
    Amplification,
}

/// L = a·p^β fitted by least squares on (log p, log L)
/// Gantree: PowerLawFit // 멱법칙 적합
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    /// Exponent β
    pub beta: f64,

    /// Coefficient a
    pub coefficient: f64,

    /// Coefficient of determination in log space
    pub r_squared: f64,

    /// Suppression or amplification
    pub regime: Regime,

    /// p* = a^{1/(1-β)}, where the fit crosses L = p
    pub pseudo_threshold: Estimate,

    /// Points used by the regression
    pub used: usize,

    /// Points excluded for p ≤ 0 or L ≤ 0
    pub excluded: Vec<(f64, f64)>,
}

impl PowerLawFit {
    /// Fitted L at `p`
    pub fn predict(&self, p: f64) -> f64 {
        self.coefficient * p.powf(self.beta)
    }
}

impl fmt::Display for PowerLawFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L = {:.4e} · p^{:.3} (R² = {:.4}, {:?}, p* = {})",
            self.coefficient, self.beta, self.r_squared, self.regime, self.pseudo_threshold
        )
    }
}

/// Fit `L = a·p^β` to (p, L) pairs
///
/// Pairs with a non-positive or non-finite coordinate are reported in
/// `excluded` and left out of the regression.
/// Gantree: fit_power_law(points) -> Result<PowerLawFit> // 회귀
pub fn fit_power_law(points: &[(f64, f64)]) -> SteaneResult<PowerLawFit> {
    let (usable, excluded): (Vec<(f64, f64)>, Vec<(f64, f64)>) = points
        .iter()
        .copied()
        .partition(|&(p, l)| p.is_finite() && l.is_finite() && p > 0.0 && l > 0.0);

    if usable.len() < MIN_FIT_POINTS {
        return Err(SteaneError::StatisticalDegenerate(format!(
            "power-law fit needs {} points with p > 0 and L > 0, got {}",
            MIN_FIT_POINTS,
            usable.len()
        )));
    }

    let xs: Vec<f64> = usable.iter().map(|&(p, _)| p.ln()).collect();
    let ys: Vec<f64> = usable.iter().map(|&(_, l)| l.ln()).collect();
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    if sxx <= f64::EPSILON {
        return Err(SteaneError::StatisticalDegenerate(
            "power-law fit needs at least two distinct physical error rates".to_string(),
        ));
    }

    let beta = sxy / sxx;
    let intercept = mean_y - beta * mean_x;
    let coefficient = intercept.exp();

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (intercept + beta * x)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    let pseudo_threshold = if (1.0 - beta).abs() < 1e-12 {
        Estimate::Undefined {
            reason: "β = 1 never crosses L = p".to_string(),
        }
    } else {
        Estimate::Defined(coefficient.powf(1.0 / (1.0 - beta)))
    };

    let regime = if beta > 1.0 {
        Regime::Suppression
    } else {
        Regime::Amplification
    };

    Ok(PowerLawFit {
        beta,
        coefficient,
        r_squared,
        regime,
        pseudo_threshold,
        used: usable.len(),
        excluded,
    })
}

/// Number of points with L < p
pub fn points_below_break_even(points: &[(f64, f64)]) -> usize {
    points.iter().filter(|&&(p, l)| l < p).count()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_estimate_ratio() {
        assert_eq!(Estimate::ratio(3, 4, "shots"), Estimate::Defined(0.75));
        let undefined = Estimate::ratio(0, 0, "shots");
        assert!(!undefined.is_defined());
        assert_eq!(undefined.value(), None);
        assert!(undefined.to_string().contains("undefined"));
        assert!(!undefined.map(|v| 1.0 - v).is_defined());
    }

    #[test]
    fn test_standard_error() {
        let se = binomial_standard_error(0.5, 100).value().unwrap();
        assert_relative_eq!(se, 0.05, epsilon = 1e-12);
        assert!(!binomial_standard_error(0.5, 0).is_defined());
    }

    #[test]
    fn test_empty_statistics_are_undefined() {
        let stats = ShotStatistics::default();
        assert!(!stats.raw_fidelity().is_defined());
        assert!(!stats.logical_error_rate().is_defined());
        assert!(!stats.nontrivial_round_fraction().is_defined());
        let report = stats.post_selection(PostSelection::AllTrivialSyndromes);
        assert!(!report.conditional_fidelity.is_defined());
        assert!(!report.effective_fidelity.is_defined());
    }

    #[test]
    fn test_merge_adds_counters() {
        let a = ShotStatistics {
            shots: 10,
            in_sector: 9,
            decoded_ok: 10,
            retained: 8,
            retained_in_sector: 8,
            retained_decoded_ok: 8,
            flagged_shots: 1,
            rounds: 30,
            nontrivial_rounds: 3,
            flagged_rounds: 1,
            patterns: PatternHistogram::default(),
        };
        let merged = a.clone().merge(a.clone());
        assert_eq!(merged.shots, 20);
        assert_eq!(merged.nontrivial_rounds, 6);
        assert_eq!(merged.raw_fidelity(), a.raw_fidelity());

        let report = merged.post_selection(PostSelection::AllTrivialSyndromes);
        assert_relative_eq!(report.yield_fraction.value().unwrap(), 0.8);
        assert_relative_eq!(report.conditional_fidelity.value().unwrap(), 1.0);
        assert_relative_eq!(report.effective_fidelity.value().unwrap(), 0.8);
        assert_relative_eq!(merged.logical_error_rate().value().unwrap(), 0.0);
    }

    #[test]
    fn test_pattern_histogram_ranking_and_merge() {
        let mut a = PatternHistogram::default();
        for s in ["0000000", "1111000", "0000000", "1000000"] {
            a.record(&Bitstring::parse(s).unwrap());
        }
        let mut b = PatternHistogram::default();
        b.record(&Bitstring::parse("1111000").unwrap());
        b.record(&Bitstring::parse("1111000").unwrap());

        let merged = a.clone().merge(b.clone());
        assert_eq!(merged.total(), 6);
        assert_eq!(merged.unique_patterns(), 3);
        assert_eq!(
            merged.most_common(2),
            vec![("1111000".to_string(), 3), ("0000000".to_string(), 2)]
        );
        assert_eq!(merged.most_common(10).len(), 3);

        assert_eq!(a.total_variation(&a), Estimate::Defined(0.0));
        assert_relative_eq!(a.total_variation(&b).value().unwrap(), 0.75, epsilon = 1e-12);
        assert!(!a.total_variation(&PatternHistogram::default()).is_defined());
    }

    #[test]
    fn test_fit_recovers_known_law() {
        let (a, beta) = (35.0, 2.0);
        let points: Vec<(f64, f64)> = [0.001, 0.002, 0.005, 0.01, 0.02]
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let jitter = 1.0 + if i % 2 == 0 { 1e-3 } else { -1e-3 };
                (p, a * f64::powf(p, beta) * jitter)
            })
            .collect();

        let fit = fit_power_law(&points).unwrap();
        assert_relative_eq!(fit.beta, beta, max_relative = 0.05);
        assert_relative_eq!(fit.coefficient, a, max_relative = 0.05);
        assert!(fit.r_squared > 0.999);
        assert_eq!(fit.regime, Regime::Suppression);
        // a·p² = p at p = 1/a
        assert_relative_eq!(
            fit.pseudo_threshold.value().unwrap(),
            1.0 / a,
            max_relative = 0.05
        );
        assert_relative_eq!(fit.predict(0.01), a * 1e-4, max_relative = 0.05);
    }

    #[test]
    fn test_fit_excludes_zero_points() {
        let points = [(0.0, 0.0), (0.01, 0.0), (0.01, 0.001), (0.02, 0.004)];
        let fit = fit_power_law(&points).unwrap();
        assert_eq!(fit.used, 2);
        assert_eq!(fit.excluded.len(), 2);
        assert_relative_eq!(fit.beta, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        let err = fit_power_law(&[(0.01, 0.001)]).unwrap_err();
        assert!(matches!(err, SteaneError::StatisticalDegenerate(_)));
        assert!(err.is_recoverable());

        assert!(fit_power_law(&[(0.0, 0.1), (0.01, 0.0)]).is_err());
        assert!(fit_power_law(&[(0.01, 0.001), (0.01, 0.002)]).is_err());
    }

    #[test]
    fn test_amplification_regime() {
        let points = [(0.01, 0.1), (0.04, 0.2), (0.16, 0.4)];
        let fit = fit_power_law(&points).unwrap();
        assert_relative_eq!(fit.beta, 0.5, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficient, 1.0, epsilon = 1e-9);
        assert_eq!(fit.regime, Regime::Amplification);
        assert_eq!(points_below_break_even(&points), 0);
    }

    #[test]
    fn test_break_even_count() {
        let points = [(0.001, 0.0001), (0.01, 0.005), (0.05, 0.2)];
        assert_eq!(points_below_break_even(&points), 2);
    }
}
