//! Descriptive statistics over a `Sample`.
//!
//! RULE: a statistic that needs a variance never returns NaN. Fewer than two
//! observations is `SurveyError::InsufficientData`, which the report layer
//! turns into a blank cell.

use crate::{
    dataset::Dataset,
    error::{SurveyError, SurveyResult},
    sample::{Predicate, Sample},
    variable::Variable,
};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatResult {
    pub estimate: f64,
    pub std_error: f64,
    pub n: usize,
}

impl StatResult {
    /// Same statistic in other units, e.g. a share as a percentage.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            estimate: self.estimate * factor,
            std_error: self.std_error * factor.abs(),
            n: self.n,
        }
    }
}

/// Mean and standard error (sample sd / √n) of `values`.
pub fn mean_and_se_of(values: &[f64], context: &str) -> SurveyResult<StatResult> {
    let n = values.len();
    if n < 2 {
        return Err(SurveyError::insufficient(context, 2, n));
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let sd = (ss / (nf - 1.0)).sqrt();
    Ok(StatResult {
        estimate: mean,
        std_error: sd / nf.sqrt(),
        n,
    })
}

/// Mean and standard error of `variable` over the non-missing rows of `sample`.
pub fn mean_and_se(dataset: &Dataset, sample: &Sample, variable: Variable) -> SurveyResult<StatResult> {
    let values = sample.values(dataset, variable);
    mean_and_se_of(&values, &format!("mean of {variable} ({})", sample.label()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Difference {
    pub diff: f64,
    pub se_diff: f64,
    /// `None` when `se_diff` is zero.
    pub t: Option<f64>,
}

/// `a − b`, with independent standard errors combined in quadrature.
pub fn difference(a: &StatResult, b: &StatResult) -> Difference {
    let diff = a.estimate - b.estimate;
    let se_diff = (a.std_error.powi(2) + b.std_error.powi(2)).sqrt();
    let t = (se_diff > 0.0).then(|| diff / se_diff);
    Difference { diff, se_diff, t }
}

/// `after − before` of two independent means, as a statistic of its own.
/// `n` is the smaller of the two counts.
pub fn change_between(after: &StatResult, before: &StatResult) -> StatResult {
    let d = difference(after, before);
    StatResult {
        estimate: d.diff,
        std_error: d.se_diff,
        n: after.n.min(before.n),
    }
}

/// Unequal-variance two-sample comparison of `variable`: mean(a) − mean(b).
pub fn two_sample_ttest(
    dataset: &Dataset,
    a: &Sample,
    b: &Sample,
    variable: Variable,
) -> SurveyResult<Difference> {
    let left = mean_and_se(dataset, a, variable)?;
    let right = mean_and_se(dataset, b, variable)?;
    Ok(difference(&left, &right))
}

// ── Proportions ────────────────────────────────────────────────

/// Share of a sample, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proportion {
    pub pct: f64,
    /// Binomial standard error in percentage points; `None` when n = 0.
    pub std_error: Option<f64>,
    pub n: usize,
}

pub fn proportion_of(successes: usize, n: usize) -> Proportion {
    if n == 0 {
        return Proportion {
            pct: 0.0,
            std_error: None,
            n,
        };
    }
    let p = successes as f64 / n as f64;
    Proportion {
        pct: p * 100.0,
        std_error: Some((p * (1.0 - p) / n as f64).sqrt() * 100.0),
        n,
    }
}

/// Share of `sample` rows satisfying `predicate`.
pub fn proportion_stats(dataset: &Dataset, sample: &Sample, predicate: &Predicate) -> Proportion {
    let hits = sample
        .rows()
        .iter()
        .filter(|&&row| predicate.matches(dataset, row))
        .count();
    proportion_of(hits, sample.len())
}

/// Pooled two-proportion statistic for `a − b`. `None` when either side is
/// empty or the pooled standard error is zero.
pub fn proportion_difference_t(a: &Proportion, b: &Proportion) -> Option<f64> {
    if a.n == 0 || b.n == 0 {
        return None;
    }
    let (n1, n2) = (a.n as f64, b.n as f64);
    let (p1, p2) = (a.pct / 100.0, b.pct / 100.0);
    let pooled = (n1 * p1 + n2 * p2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    (se > 0.0).then(|| (p1 - p2) / se)
}

// ── Joint significance ─────────────────────────────────────────

/// What the F-test needs from a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelFit {
    pub rss: f64,
    pub n: usize,
    /// Estimated parameters, intercept included.
    pub k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FTest {
    pub f: f64,
    pub df_num: usize,
    pub df_den: usize,
    pub p_value: f64,
}

/// F-test of the restrictions that turn `full` into `restricted`.
/// Both fits must cover the same observations.
pub fn f_test_pvalue(full: &ModelFit, restricted: &ModelFit) -> SurveyResult<FTest> {
    if full.n != restricted.n {
        return Err(SurveyError::Configuration(format!(
            "F-test compares fits on different rows ({} vs {})",
            full.n, restricted.n
        )));
    }
    if full.k <= restricted.k {
        return Err(SurveyError::Configuration(format!(
            "F-test needs more parameters in the full model ({} vs {})",
            full.k, restricted.k
        )));
    }
    if full.n <= full.k {
        return Err(SurveyError::insufficient("F-test", full.k + 1, full.n));
    }

    let df_num = full.k - restricted.k;
    let df_den = full.n - full.k;
    let gain = (restricted.rss - full.rss).max(0.0);

    if full.rss <= 0.0 {
        // Perfect fit: any remaining gain is infinitely significant.
        let (f, p_value) = if gain > 0.0 { (f64::INFINITY, 0.0) } else { (0.0, 1.0) };
        return Ok(FTest { f, df_num, df_den, p_value });
    }

    let f = (gain / df_num as f64) / (full.rss / df_den as f64);
    let dist = FisherSnedecor::new(df_num as f64, df_den as f64)
        .map_err(|e| SurveyError::Configuration(format!("F distribution: {e}")))?;
    let p_value = (1.0 - dist.cdf(f)).clamp(0.0, 1.0);
    Ok(FTest { f, df_num, df_den, p_value })
}
