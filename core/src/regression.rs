//! Linear regression runner (OLS / WLS) on top of nalgebra.
//!
//! RULE: a degenerate column is dropped and named in `dropped`, never solved
//! into a NaN coefficient. Only when every slope column is degenerate does a
//! fit fail with `RankDeficiency`.
//!
//! Observations with any missing value in the dependent variable, a
//! regressor, a control column, or the weight are removed before fitting
//! (listwise deletion). An intercept is always estimated.
//!
//! Weighted rows with weight zero stay in the design as all-zero rows: they
//! count toward `n` and `df_resid` and add nothing to the estimates.

use crate::{
    dataset::Dataset,
    error::{SurveyError, SurveyResult},
    sample::Sample,
    stats::{f_test_pvalue, ModelFit},
    variable::{Units, Variable},
};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashSet;

/// Residual norm below this share of the column norm marks a column as
/// linearly dependent on the columns kept before it.
const RANK_TOLERANCE: f64 = 1e-8;

pub const INTERCEPT: &str = "intercept";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlBlock {
    /// Burger King, KFC, Roy Rogers dummies plus company ownership.
    /// Wendy's is the omitted chain.
    ChainOwnership,
    /// Central and south NJ, PA1, PA2. North NJ is the omitted region.
    Region,
    /// Wave-2 interview week dummies. Week 0 is omitted.
    InterviewWeek,
}

impl ControlBlock {
    pub fn columns(&self) -> &'static [Variable] {
        match self {
            Self::ChainOwnership => &[
                Variable::BurgerKing,
                Variable::Kfc,
                Variable::RoyRogers,
                Variable::CompanyOwned,
            ],
            Self::Region => &[
                Variable::CentralJersey,
                Variable::SouthJersey,
                Variable::Pennsylvania1,
                Variable::Pennsylvania2,
            ],
            Self::InterviewWeek => &[
                Variable::InterviewWeek1,
                Variable::InterviewWeek2,
                Variable::InterviewWeek3,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSpec {
    pub dependent: Variable,
    pub regressors: Vec<Variable>,
    #[serde(default)]
    pub controls: Vec<ControlBlock>,
    #[serde(default)]
    pub weight: Option<Variable>,
}

impl RegressionSpec {
    pub fn new(dependent: Variable) -> Self {
        Self {
            dependent,
            regressors: Vec::new(),
            controls: Vec::new(),
            weight: None,
        }
    }

    pub fn regressor(mut self, variable: Variable) -> Self {
        self.regressors.push(variable);
        self
    }

    pub fn controls(mut self, block: ControlBlock) -> Self {
        self.controls.push(block);
        self
    }

    pub fn weighted_by(mut self, weight: Variable) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Regressors followed by control columns, in block order.
    pub fn columns(&self) -> Vec<Variable> {
        self.regressors
            .iter()
            .copied()
            .chain(self.controls.iter().flat_map(|b| b.columns().iter().copied()))
            .collect()
    }

    pub fn control_columns(&self) -> HashSet<Variable> {
        self.controls
            .iter()
            .flat_map(|b| b.columns().iter().copied())
            .collect()
    }

    pub fn validate(&self) -> SurveyResult<()> {
        let columns = self.columns();
        if columns.is_empty() {
            return Err(SurveyError::Configuration(format!(
                "regression of {} has no regressors",
                self.dependent
            )));
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if *column == self.dependent {
                return Err(SurveyError::Configuration(format!(
                    "{column} is both the dependent variable and a regressor"
                )));
            }
            if !seen.insert(*column) {
                return Err(SurveyError::Configuration(format!(
                    "{column} appears more than once among regressors and controls"
                )));
            }
        }
        let mut blocks = HashSet::new();
        for block in &self.controls {
            if !blocks.insert(block) {
                return Err(SurveyError::Configuration(format!(
                    "control block {block:?} requested twice"
                )));
            }
        }
        if let Some(weight) = self.weight {
            if weight.units() == Units::Indicator {
                return Err(SurveyError::Configuration(format!(
                    "{weight} is a dummy and cannot serve as a regression weight"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// `None` when the standard error is zero.
    pub t: Option<f64>,
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub dependent: Variable,
    pub units: Units,
    pub sample: String,
    pub intercept: Coefficient,
    pub coefficients: Vec<Coefficient>,
    pub n: usize,
    /// Estimated parameters, intercept included.
    pub k: usize,
    pub rss: f64,
    pub df_resid: usize,
    /// Centered (weighted) R². `None` when the dependent variable is constant.
    pub r_squared: Option<f64>,
    pub regression_se: f64,
    /// Columns removed by the rank check, in column order.
    pub dropped: Vec<String>,
    /// Joint test that every surviving control column is zero.
    pub control_pvalue: Option<f64>,
    pub weighted: bool,
    pub dependent_mean: f64,
    pub dependent_sd: Option<f64>,
}

impl RegressionResult {
    pub fn coefficient(&self, variable: Variable) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == variable.name())
    }

    pub fn model_fit(&self) -> ModelFit {
        ModelFit {
            rss: self.rss,
            n: self.n,
            k: self.k,
        }
    }
}

/// Listwise-complete observations, √w-scaled.
struct Design {
    x: DMatrix<f64>,
    y: DVector<f64>,
    raw_y: Vec<f64>,
}

impl Design {
    fn collect(dataset: &Dataset, sample: &Sample, spec: &RegressionSpec, columns: &[Variable]) -> Self {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut ys = Vec::new();
        let mut raw_y = Vec::new();

        'rows: for &row in sample.rows() {
            let Some(y) = dataset.value(row, spec.dependent) else {
                continue;
            };
            let scale = match spec.weight {
                None => 1.0,
                // A zero weight keeps the row in n but out of the estimates.
                Some(w) => match dataset.value(row, w) {
                    Some(w) if w >= 0.0 => w.sqrt(),
                    _ => continue,
                },
            };
            let mut x = Vec::with_capacity(columns.len() + 1);
            x.push(scale);
            for &column in columns {
                let Some(v) = dataset.value(row, column) else {
                    continue 'rows;
                };
                x.push(v * scale);
            }
            rows.push(x);
            ys.push(y * scale);
            raw_y.push(y);
        }

        let n = rows.len();
        let width = columns.len() + 1;
        Self {
            x: DMatrix::from_fn(n, width, |i, j| rows[i][j]),
            y: DVector::from_vec(ys),
            raw_y,
        }
    }

    fn n(&self) -> usize {
        self.y.len()
    }

    /// Sum of squares around the (weighted) mean: the rss of an
    /// intercept-only fit on the scaled rows.
    fn total_sum_of_squares(&self) -> Option<f64> {
        let scale = self.x.column(0);
        let weight_sum = scale.norm_squared();
        if weight_sum <= 0.0 {
            return None;
        }
        let mean = scale.dot(&self.y) / weight_sum;
        Some((&self.y - scale * mean).norm_squared())
    }
}

struct LeastSquares {
    beta: DVector<f64>,
    rss: f64,
    r_inverse: DMatrix<f64>,
}

fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> SurveyResult<LeastSquares> {
    let qr = x.clone().qr();
    let q = qr.q();
    let r = qr.r();
    let qty = q.transpose() * y;
    let singular = || SurveyError::Other(anyhow::anyhow!("design matrix is singular after rank check"));
    let beta = r.solve_upper_triangular(&qty).ok_or_else(singular)?;
    let r_inverse = r.try_inverse().ok_or_else(singular)?;
    let residuals = y - x * &beta;
    Ok(LeastSquares {
        beta,
        rss: residuals.norm_squared(),
        r_inverse,
    })
}

/// Greedy left-to-right rank check. Column 0 (the intercept) is always kept.
fn independent_columns(x: &DMatrix<f64>) -> Vec<usize> {
    let mut kept = vec![0];
    for j in 1..x.ncols() {
        let candidate = x.column(j).into_owned();
        let norm = candidate.norm();
        if norm == 0.0 {
            continue;
        }
        let q = x.select_columns(&kept).qr().q();
        let residual = &candidate - &q * (q.transpose() * &candidate);
        if residual.norm() > RANK_TOLERANCE * norm {
            kept.push(j);
        }
    }
    kept
}

fn describe(values: &[f64]) -> (f64, Option<f64>) {
    let n = values.len() as f64;
    let mean = if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / n };
    let sd = (values.len() >= 2).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });
    (mean, sd)
}

pub fn fit(dataset: &Dataset, sample: &Sample, spec: &RegressionSpec) -> SurveyResult<RegressionResult> {
    spec.validate()?;
    let columns = spec.columns();
    let design = Design::collect(dataset, sample, spec, &columns);
    let n = design.n();
    let context = format!("regression of {} ({})", spec.dependent, sample.label());

    if n == 0 {
        return Err(SurveyError::insufficient(context, columns.len() + 2, 0));
    }

    let kept = independent_columns(&design.x);
    let dropped: Vec<String> = (1..design.x.ncols())
        .filter(|j| !kept.contains(j))
        .map(|j| columns[j - 1].name().to_string())
        .collect();
    if !dropped.is_empty() {
        log::warn!("regression: {context}: dropped degenerate columns {dropped:?}");
    }
    if kept.len() == 1 {
        return Err(SurveyError::RankDeficiency { dropped });
    }

    let k = kept.len();
    if n <= k {
        return Err(SurveyError::insufficient(context, k + 1, n));
    }

    let x = design.x.select_columns(&kept);
    let ls = least_squares(&x, &design.y)?;
    let df_resid = n - k;
    let sigma2 = ls.rss / df_resid as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| SurveyError::Configuration(format!("t distribution: {e}")))?;

    let coefficient = |idx: usize, name: &str| {
        let estimate = ls.beta[idx];
        let variance: f64 = ls.r_inverse.row(idx).iter().map(|v| v * v).sum::<f64>() * sigma2;
        let std_error = variance.max(0.0).sqrt();
        let t = (std_error > 0.0).then(|| estimate / std_error);
        let p_value = t.map(|t| (2.0 * (1.0 - t_dist.cdf(t.abs()))).clamp(0.0, 1.0));
        Coefficient {
            name: name.to_string(),
            estimate,
            std_error,
            t,
            p_value,
        }
    };

    let intercept = coefficient(0, INTERCEPT);
    let coefficients: Vec<Coefficient> = kept
        .iter()
        .enumerate()
        .skip(1)
        .map(|(idx, &j)| coefficient(idx, columns[j - 1].name()))
        .collect();

    let control_columns = spec.control_columns();
    let restricted: Vec<usize> = kept
        .iter()
        .copied()
        .filter(|&j| j == 0 || !control_columns.contains(&columns[j - 1]))
        .collect();
    let control_pvalue = if restricted.len() < k {
        let restricted_fit = least_squares(&design.x.select_columns(&restricted), &design.y)?;
        let test = f_test_pvalue(
            &ModelFit { rss: ls.rss, n, k },
            &ModelFit {
                rss: restricted_fit.rss,
                n,
                k: restricted.len(),
            },
        )?;
        Some(test.p_value)
    } else {
        None
    };

    let r_squared = design
        .total_sum_of_squares()
        .filter(|&tss| tss > 0.0)
        .map(|tss| 1.0 - ls.rss / tss);
    let (dependent_mean, dependent_sd) = describe(&design.raw_y);
    log::debug!(
        "regression: {context}: n={n} k={k} rss={:.6} controls_p={control_pvalue:?}",
        ls.rss
    );

    Ok(RegressionResult {
        dependent: spec.dependent,
        units: spec.dependent.units(),
        sample: sample.label().to_string(),
        intercept,
        coefficients,
        n,
        k,
        rss: ls.rss,
        df_resid,
        r_squared,
        regression_se: sigma2.sqrt(),
        dropped,
        control_pvalue,
        weighted: spec.weight.is_some(),
        dependent_mean,
        dependent_sd,
    })
}
