//! Means of key variables by state: store types, then wave-1 and wave-2
//! characteristics, each with a test of equality between the states.
//!
//! Shares (chain, ownership, wage at a given rate, bonus programs) are
//! computed over stores with the item recorded. Their test statistic is the
//! pooled two-proportion t; means use the unequal-variance form.

use crate::{
    dataset::Dataset,
    error::SurveyResult,
    record::{Chain, State},
    report::{blank_if_recoverable, format_number, format_percent, proportion_cell, stat_cell, Table},
    sample::{select, Predicate, Sample, WageBracket},
    stats::{difference, mean_and_se, proportion_difference_t, proportion_stats, Proportion},
    variable::Variable,
};

struct States {
    nj: Sample,
    pa: Sample,
}

impl States {
    fn new(dataset: &Dataset) -> Self {
        Self {
            nj: select(dataset, &[Predicate::State(State::NewJersey)]),
            pa: select(dataset, &[Predicate::State(State::Pennsylvania)]),
        }
    }

    fn shares(&self, dataset: &Dataset, recorded: &[Predicate], hit: &Predicate) -> (Proportion, Proportion) {
        let share = |s: &Sample| proportion_stats(dataset, &s.refine(dataset, recorded), hit);
        (share(&self.nj), share(&self.pa))
    }

    /// Store-type distribution: percentages only.
    fn distribution_row(&self, dataset: &Dataset, hit: &Predicate) -> Vec<String> {
        let (nj, pa) = self.shares(dataset, &[], hit);
        let pct = |p: &Proportion| if p.n == 0 { String::new() } else { format_percent(Some(p.pct), 1) };
        vec![pct(&nj), pct(&pa), format_number(proportion_difference_t(&nj, &pa), 1)]
    }

    fn share_row(&self, dataset: &Dataset, recorded: Variable, hit: Predicate) -> Vec<String> {
        let (nj, pa) = self.shares(dataset, &[Predicate::HasValues(vec![recorded])], &hit);
        let cell = |p: &Proportion| if p.n == 0 { String::new() } else { proportion_cell(p, 1) };
        vec![cell(&nj), cell(&pa), format_number(proportion_difference_t(&nj, &pa), 1)]
    }

    fn mean_row(
        &self,
        dataset: &Dataset,
        variable: Variable,
        factor: f64,
        decimals: usize,
    ) -> SurveyResult<Vec<String>> {
        let mean = |s: &Sample| -> SurveyResult<_> {
            Ok(blank_if_recoverable(mean_and_se(dataset, s, variable))?.map(|m| m.scaled(factor)))
        };
        let (nj, pa) = (mean(&self.nj)?, mean(&self.pa)?);
        let t = match (&nj, &pa) {
            (Some(a), Some(b)) => difference(a, b).t,
            _ => None,
        };
        Ok(vec![
            stat_cell(nj.as_ref(), decimals),
            stat_cell(pa.as_ref(), decimals),
            format_number(t, 1),
        ])
    }
}

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let states = States::new(dataset);
    let prior = dataset.config().prior_minimum;
    let target = dataset.config().wage_target;

    let mut table = Table::new(
        "Table 2: Means of key variables",
        vec!["Variable".into(), "NJ".into(), "PA".into(), "t (a)".into()],
    );

    table.push_row("1. Distribution of store types (percentages):", Vec::new());
    for (label, chain) in [
        ("a. Burger King", Chain::BurgerKing),
        ("b. KFC", Chain::Kfc),
        ("c. Roy Rogers", Chain::RoyRogers),
        ("d. Wendy's", Chain::Wendys),
    ] {
        table.push_row(label, states.distribution_row(dataset, &Predicate::ChainIn(vec![chain])));
    }
    table.push_row(
        "e. Company-owned",
        states.distribution_row(dataset, &Predicate::Indicator(Variable::CompanyOwned)),
    );

    table.push_row("2. Means in wave 1:", Vec::new());
    table.push_row("a. FTE employment", states.mean_row(dataset, Variable::FteFirst, 1.0, 2)?);
    table.push_row(
        "b. Percentage full-time employees",
        states.mean_row(dataset, Variable::FullTimeShareFirst, 100.0, 1)?,
    );
    table.push_row("c. Starting wage", states.mean_row(dataset, Variable::WageFirst, 1.0, 2)?);
    table.push_row(
        format!("d. Wage = ${prior:.2} (percentage)"),
        states.share_row(dataset, Variable::WageFirst, Predicate::WageBracket(WageBracket::Exactly(prior))),
    );
    table.push_row("e. Price of full meal", states.mean_row(dataset, Variable::MealPriceFirst, 1.0, 2)?);
    table.push_row("f. Hours open (weekday)", states.mean_row(dataset, Variable::HoursOpenFirst, 1.0, 1)?);
    table.push_row(
        "g. Recruiting bonus (percentage)",
        states.share_row(dataset, Variable::RecruitingBonus, Predicate::Indicator(Variable::RecruitingBonus)),
    );

    table.push_row("3. Means in wave 2:", Vec::new());
    table.push_row("a. FTE employment", states.mean_row(dataset, Variable::FteSecond, 1.0, 2)?);
    table.push_row(
        "b. Percentage full-time employees",
        states.mean_row(dataset, Variable::FullTimeShareSecond, 100.0, 1)?,
    );
    table.push_row("c. Starting wage", states.mean_row(dataset, Variable::WageSecond, 1.0, 2)?);
    table.push_row(
        format!("d. Wage = ${prior:.2} (percentage)"),
        states.share_row(dataset, Variable::WageSecond, Predicate::SecondWaveWage(WageBracket::Exactly(prior))),
    );
    table.push_row(
        format!("e. Wage = ${target:.2} (percentage)"),
        states.share_row(dataset, Variable::WageSecond, Predicate::SecondWaveWage(WageBracket::Exactly(target))),
    );
    table.push_row("f. Price of full meal", states.mean_row(dataset, Variable::MealPriceSecond, 1.0, 2)?);
    table.push_row("g. Hours open (weekday)", states.mean_row(dataset, Variable::HoursOpenSecond, 1.0, 1)?);
    table.push_row(
        "h. Special program for new workers (percentage)",
        states.share_row(dataset, Variable::SpecialProgram, Predicate::Indicator(Variable::SpecialProgram)),
    );

    table.footnote(
        "Standard errors in parentheses. Percentages are computed over stores with the item recorded. \
         Wave-2 employment counts permanently closed stores as zero.",
    );
    table.footnote(
        "(a) t statistic for equality of New Jersey and Pennsylvania: pooled two-proportion test \
         for percentages, unequal-variance test for means.",
    );
    Ok(table)
}
