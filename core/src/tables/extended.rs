//! Extended employment models: the gap model with chain and ownership
//! controls, then the same model plus a dummy for New Jersey stores at the
//! old minimum, then plus the squared gap.

use super::{reduced_form::sample_note, try_fit};
use crate::{
    dataset::Dataset,
    error::SurveyResult,
    regression::{ControlBlock, RegressionResult, RegressionSpec},
    report::{coefficient_cell, format_number, yes_no, Table},
    sample::{select, Predicate},
    variable::Variable,
};

const DECIMALS: usize = 2;

/// Where the fitted quadratic in the gap turns: −b₁ / (2 b₂).
pub fn turning_point(fit: &RegressionResult) -> Option<f64> {
    let linear = fit.coefficient(Variable::WageGap)?.estimate;
    let squared = fit.coefficient(Variable::WageGapSquared)?.estimate;
    (squared != 0.0).then(|| -linear / (2.0 * squared))
}

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let sample = select(dataset, &[Predicate::AnalysisSample]);
    let base = RegressionSpec::new(Variable::EmploymentChange)
        .regressor(Variable::WageGap)
        .controls(ControlBlock::ChainOwnership);
    // (model spec, the variable it adds to the base model)
    let models = [
        (base.clone(), None),
        (base.clone().regressor(Variable::AtPriorMinimumNj), Some(Variable::AtPriorMinimumNj)),
        (base.regressor(Variable::WageGapSquared), Some(Variable::WageGapSquared)),
    ];
    let fits = models
        .iter()
        .map(|(spec, _)| try_fit(dataset, &sample, spec))
        .collect::<SurveyResult<Vec<_>>>()?;

    let config = dataset.config();
    let mut table = Table::new(
        "Table 9: Extended models for change in employment",
        vec![
            "Independent variable".into(),
            "(i)".into(),
            "(ii)".into(),
            "(iii)".into(),
        ],
    );

    let coef_row = |variable: Variable| -> Vec<String> {
        fits.iter()
            .map(|f| coefficient_cell(f.as_ref(), variable, DECIMALS))
            .collect()
    };
    let stat_row = |stat: fn(&RegressionResult) -> Option<f64>, decimals: usize| -> Vec<String> {
        fits.iter()
            .map(|f| format_number(f.as_ref().and_then(stat), decimals))
            .collect()
    };

    table.push_row("1. Initial wage gap (a)", coef_row(Variable::WageGap));
    table.push_row(
        format!("2. NJ dummy for ${:.2} starting wage (b)", config.prior_minimum),
        coef_row(Variable::AtPriorMinimumNj),
    );
    table.push_row("3. Initial wage gap squared", coef_row(Variable::WageGapSquared));
    table.push_row(
        "4. Controls for chain and ownership (c)",
        models.iter().map(|(spec, _)| yes_no(spec.controls.contains(&ControlBlock::ChainOwnership))).collect(),
    );
    table.push_row("5. R-squared", stat_row(|r: &RegressionResult| r.r_squared, 3));
    table.push_row("6. Standard error of regression", stat_row(|r: &RegressionResult| Some(r.regression_se), DECIMALS));
    table.push_row("7. Probability value for controls (d)", stat_row(|r: &RegressionResult| r.control_pvalue, 2));
    table.push_row(
        "8. Probability value for added variable (e)",
        models
            .iter()
            .zip(&fits)
            .map(|((_, added), fit)| {
                let p = added.and_then(|v| fit.as_ref()?.coefficient(v)?.p_value);
                format_number(p, 2)
            })
            .collect(),
    );

    table.footnote(sample_note(&fits, "the change in FTE employment", DECIMALS));
    table.footnote(format!(
        "(a) Proportional increase in the starting wage needed to reach ${:.2}. Zero for Pennsylvania stores.",
        config.wage_target
    ));
    table.footnote(format!(
        "(b) Equals 1 for New Jersey stores paying ${:.2} in wave 1.",
        config.prior_minimum
    ));
    table.footnote("(c) Three chain dummies and a company-owned dummy.");
    table.footnote("(d) Probability value of the joint F-test excluding the chain and ownership dummies.");
    table.footnote("(e) Probability value of the t-test on the variable added to model (i).");
    if let Some(turn) = fits[2].as_ref().and_then(turning_point) {
        let benchmark = (config.wage_target - config.prior_minimum) / config.prior_minimum;
        table.footnote(format!(
            "Model (iii) turns at a gap of {turn:.4}; a store at ${:.2} has a gap of {benchmark:.4}.",
            config.prior_minimum
        ));
    }
    Ok(table)
}
