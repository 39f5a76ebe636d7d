//! Reduced-form models for the change in employment, models (i) to (v).
//!
//! The same five specifications, with another dependent variable, drive the
//! meal-price table.

use super::try_fit;
use crate::{
    dataset::Dataset,
    error::SurveyResult,
    regression::{ControlBlock, RegressionResult, RegressionSpec},
    report::{coefficient_cell, format_number, yes_no, Table},
    sample::{select, Predicate, Sample},
    variable::Variable,
};

pub(crate) const MODEL_HEADERS: [&str; 5] = ["(i)", "(ii)", "(iii)", "(iv)", "(v)"];

/// (i) NJ; (ii) NJ + chain/ownership; (iii) gap; (iv) gap + chain/ownership;
/// (v) gap + chain/ownership + region.
pub(crate) fn five_models(dependent: Variable) -> [RegressionSpec; 5] {
    let nj = RegressionSpec::new(dependent).regressor(Variable::NewJersey);
    let gap = RegressionSpec::new(dependent).regressor(Variable::WageGap);
    [
        nj.clone(),
        nj.controls(ControlBlock::ChainOwnership),
        gap.clone(),
        gap.clone().controls(ControlBlock::ChainOwnership),
        gap.controls(ControlBlock::ChainOwnership)
            .controls(ControlBlock::Region),
    ]
}

/// Fit the five models on `sample` and lay them out as table rows.
pub(crate) fn five_model_table(
    title: &str,
    dataset: &Dataset,
    sample: &Sample,
    dependent: Variable,
    decimals: usize,
) -> SurveyResult<(Table, Vec<Option<RegressionResult>>)> {
    let specs = five_models(dependent);
    let fits = specs
        .iter()
        .map(|spec| try_fit(dataset, sample, spec))
        .collect::<SurveyResult<Vec<_>>>()?;

    let mut columns = vec!["Independent variable".to_string()];
    columns.extend(MODEL_HEADERS.iter().map(|h| h.to_string()));
    let mut table = Table::new(title, columns);

    let coef_row = |variable: Variable| -> Vec<String> {
        fits.iter()
            .map(|f| coefficient_cell(f.as_ref(), variable, decimals))
            .collect()
    };
    let has_block = |block: ControlBlock| -> Vec<String> {
        specs.iter().map(|s| yes_no(s.controls.contains(&block))).collect()
    };

    table.push_row("1. New Jersey dummy", coef_row(Variable::NewJersey));
    table.push_row("2. Initial wage gap (a)", coef_row(Variable::WageGap));
    table.push_row("3. Controls for chain and ownership (b)", has_block(ControlBlock::ChainOwnership));
    table.push_row("4. Controls for region (c)", has_block(ControlBlock::Region));
    table.push_row(
        "5. Standard error of regression",
        fits.iter()
            .map(|f| format_number(f.as_ref().map(|r| r.regression_se), decimals))
            .collect(),
    );
    table.push_row(
        "6. Probability value for controls (d)",
        fits.iter()
            .map(|f| format_number(f.as_ref().and_then(|r| r.control_pvalue), 2))
            .collect(),
    );

    Ok((table, fits))
}

/// Shared footnotes (a) to (d).
pub(crate) fn model_footnotes(table: &mut Table, target: f64) {
    table.footnote(format!(
        "(a) Proportional increase in the starting wage needed to reach ${target:.2}. \
         Zero for Pennsylvania stores."
    ));
    table.footnote("(b) Three chain dummies and a company-owned dummy.");
    table.footnote("(c) Dummies for two New Jersey regions and two eastern Pennsylvania regions.");
    table.footnote("(d) Probability value of the joint F-test excluding all control variables.");
}

pub(crate) fn sample_note(fits: &[Option<RegressionResult>], what: &str, decimals: usize) -> String {
    match fits.first().and_then(Option::as_ref) {
        Some(base) => format!(
            "Standard errors in parentheses. Sample of {} stores. The dependent variable is {what}; \
             its mean and standard deviation are {} and {}. Every model includes an unrestricted constant.",
            base.n,
            format_number(Some(base.dependent_mean), decimals + 1),
            format_number(base.dependent_sd, decimals + 1),
        ),
        None => format!("Standard errors in parentheses. The dependent variable is {what}."),
    }
}

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let sample = select(dataset, &[Predicate::AnalysisSample]);
    let (mut table, fits) = five_model_table(
        "Table 4: Reduced-form models for change in employment",
        dataset,
        &sample,
        Variable::EmploymentChange,
        2,
    )?;
    table.footnote(sample_note(&fits, "the change in FTE employment", 2));
    model_footnotes(&mut table, dataset.config().wage_target);
    Ok(table)
}
