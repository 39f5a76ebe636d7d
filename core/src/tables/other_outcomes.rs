//! Effects of the minimum-wage rise on outcomes other than employment:
//! store characteristics, employee meal programs, and the wage profile.
//!
//! Columns (i)-(iii) are mean changes by state over stores with the outcome
//! recorded in both waves. Columns (iv)-(vi) are the coefficients of the NJ
//! dummy and the wage gap in regressions of the change on chain and
//! ownership dummies; (vi) adds region dummies.

use super::try_fit;
use crate::{
    dataset::Dataset,
    error::SurveyResult,
    record::State,
    regression::{ControlBlock, RegressionSpec},
    report::{blank_if_recoverable, coefficient_cell, difference_cell, stat_cell, Table},
    sample::{select, Predicate, Sample},
    stats::{difference, mean_and_se},
    variable::Variable,
};

const DECIMALS: usize = 2;

const STORE_CHARACTERISTICS: [(&str, Variable); 4] = [
    ("1. Fraction full-time workers (percentage) (c)", Variable::FullTimeShareChange),
    ("2. Number of hours open per weekday", Variable::HoursOpenChange),
    ("3. Number of cash registers", Variable::RegistersChange),
    ("4. Number of cash registers open at 11:00 a.m.", Variable::RegistersAt11Change),
];

const MEAL_PROGRAMS: [(&str, Variable); 3] = [
    ("5. Low-price meal program (percentage)", Variable::LowPriceMealChange),
    ("6. Free meal program (percentage)", Variable::FreeMealChange),
    ("7. Combination of low-price and free meals (percentage)", Variable::ComboMealChange),
];

const WAGE_PROFILE: [(&str, Variable); 3] = [
    ("8. Time to first raise", Variable::FirstRaiseTimeChange),
    ("9. Usual amount of first raise", Variable::FirstRaiseAmountChange),
    ("10. Slope of wage profile (percent per week)", Variable::WageSlopeChange),
];

fn outcome_row(dataset: &Dataset, all: &Sample, nj: &Sample, pa: &Sample, outcome: Variable) -> SurveyResult<Vec<String>> {
    let nj_mean = blank_if_recoverable(mean_and_se(dataset, nj, outcome))?;
    let pa_mean = blank_if_recoverable(mean_and_se(dataset, pa, outcome))?;
    let gap = match (&nj_mean, &pa_mean) {
        (Some(a), Some(b)) => Some(difference(a, b)),
        _ => None,
    };

    let base = |treatment: Variable| {
        RegressionSpec::new(outcome)
            .regressor(treatment)
            .controls(ControlBlock::ChainOwnership)
    };
    let models = [
        (base(Variable::NewJersey), Variable::NewJersey),
        (base(Variable::WageGap), Variable::WageGap),
        (base(Variable::WageGap).controls(ControlBlock::Region), Variable::WageGap),
    ];

    let mut cells = vec![
        stat_cell(nj_mean.as_ref(), DECIMALS),
        stat_cell(pa_mean.as_ref(), DECIMALS),
        difference_cell(gap.as_ref(), DECIMALS),
    ];
    for (spec, treatment) in &models {
        let fit = try_fit(dataset, all, spec)?;
        cells.push(coefficient_cell(fit.as_ref(), *treatment, DECIMALS));
    }
    Ok(cells)
}

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let all = Sample::all(dataset);
    let nj = select(dataset, &[Predicate::State(State::NewJersey)]);
    let pa = select(dataset, &[Predicate::State(State::Pennsylvania)]);

    let mut table = Table::new(
        "Table 6: Effects of minimum-wage increase on other outcomes",
        vec![
            "Outcome measure".into(),
            "NJ (i)".into(),
            "PA (ii)".into(),
            "NJ - PA (iii)".into(),
            "NJ dummy (iv)".into(),
            "Wage gap (v) (a)".into(),
            "Wage gap (vi) (b)".into(),
        ],
    );

    for (heading, outcomes) in [
        ("Store characteristics:", &STORE_CHARACTERISTICS[..]),
        ("Employee meal programs:", &MEAL_PROGRAMS[..]),
        ("Wage profile:", &WAGE_PROFILE[..]),
    ] {
        table.push_row(heading, Vec::new());
        for &(label, outcome) in outcomes {
            table.push_row(label, outcome_row(dataset, &all, &nj, &pa, outcome)?);
        }
    }

    table.footnote(
        "Columns (i) and (ii) are mean changes for stores with the outcome recorded in both waves, \
         standard errors in parentheses. Columns (iv)-(vi) are regression coefficients of the NJ dummy \
         or the initial wage gap in models for the change in the outcome, with chain and \
         company-ownership dummies.",
    );
    table.footnote(format!(
        "(a) Proportional increase in the starting wage needed to reach ${:.2}. Zero for Pennsylvania stores.",
        dataset.config().wage_target
    ));
    table.footnote("(b) Adds dummies for two New Jersey regions and two eastern Pennsylvania regions.");
    table.footnote("(c) Full-time workers as a share of FTE employment.");
    Ok(table)
}
