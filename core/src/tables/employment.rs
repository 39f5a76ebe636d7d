//! Average FTE employment per store, before and after, by state and by
//! New Jersey starting-wage bracket.

use crate::{
    dataset::Dataset,
    derived::TempClosedPolicy,
    error::SurveyResult,
    record::State,
    report::{blank_if_recoverable, difference_cell, stat_cell, Table},
    sample::{select, Predicate, Sample, WageBracket},
    stats::{change_between, difference, mean_and_se, StatResult},
    variable::Variable,
};

/// Top of the middle bracket, exclusive.
const HIGH_WAGE: f64 = 5.00;

const DECIMALS: usize = 2;

/// The five store groups, in column order.
struct Groups {
    pa: Sample,
    nj: Sample,
    low: Sample,
    mid: Sample,
    high: Sample,
}

impl Groups {
    fn new(dataset: &Dataset) -> Self {
        let prior = dataset.config().prior_minimum;
        let nj = select(dataset, &[Predicate::State(State::NewJersey)]);
        let bracket = |b: WageBracket| nj.refine(dataset, &[Predicate::WageBracket(b)]);
        Self {
            pa: select(dataset, &[Predicate::State(State::Pennsylvania)]),
            low: bracket(WageBracket::Exactly(prior)),
            mid: bracket(WageBracket::Range {
                lo: prior + 0.01,
                hi: HIGH_WAGE,
            }),
            high: bracket(WageBracket::AtLeast(HIGH_WAGE)),
            nj,
        }
    }

    fn refine(&self, dataset: &Dataset, predicates: &[Predicate]) -> Self {
        Self {
            pa: self.pa.refine(dataset, predicates),
            nj: self.nj.refine(dataset, predicates),
            low: self.low.refine(dataset, predicates),
            mid: self.mid.refine(dataset, predicates),
            high: self.high.refine(dataset, predicates),
        }
    }
}

/// One statistic per group.
struct GroupStats([Option<StatResult>; 5]);

impl GroupStats {
    fn means(dataset: &Dataset, groups: &Groups, variable: Variable) -> SurveyResult<Self> {
        let mean = |s: &Sample| blank_if_recoverable(mean_and_se(dataset, s, variable));
        Ok(Self([
            mean(&groups.pa)?,
            mean(&groups.nj)?,
            mean(&groups.low)?,
            mean(&groups.mid)?,
            mean(&groups.high)?,
        ]))
    }

    /// Group-wise `after − before`, standard errors combined in quadrature.
    fn change(after: &Self, before: &Self) -> Self {
        let mut out = [None; 5];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = match (&after.0[i], &before.0[i]) {
                (Some(a), Some(b)) => Some(change_between(a, b)),
                _ => None,
            };
        }
        Self(out)
    }

    fn cells(&self) -> Vec<String> {
        let [pa, nj, low, mid, high] = &self.0;
        let gap = |a: &Option<StatResult>, b: &Option<StatResult>| match (a, b) {
            (Some(a), Some(b)) => difference_cell(Some(&difference(a, b)), DECIMALS),
            _ => String::new(),
        };
        vec![
            stat_cell(pa.as_ref(), DECIMALS),
            stat_cell(nj.as_ref(), DECIMALS),
            gap(nj, pa),
            stat_cell(low.as_ref(), DECIMALS),
            stat_cell(mid.as_ref(), DECIMALS),
            stat_cell(high.as_ref(), DECIMALS),
            gap(low, high),
            gap(mid, high),
        ]
    }
}

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let base_config = dataset.config().clone().with_temp_closed(TempClosedPolicy::Missing);
    let base = dataset.rederive(base_config.clone())?;
    let zeroed = dataset.rederive(base_config.with_temp_closed(TempClosedPolicy::Zero))?;

    let groups = Groups::new(&base);
    let balanced = groups.refine(&base, &[Predicate::BalancedPanel]);
    let zeroed_groups = Groups::new(&zeroed).refine(&zeroed, &[Predicate::BalancedPanel]);

    let before = GroupStats::means(&base, &groups, Variable::FteFirst)?;
    let after = GroupStats::means(&base, &groups, Variable::FteSecond)?;
    let change = GroupStats::change(&after, &before);
    let balanced_change = GroupStats::means(&base, &balanced, Variable::EmploymentChange)?;
    let zeroed_change = GroupStats::means(&zeroed, &zeroed_groups, Variable::EmploymentChange)?;

    let prior = base.config().prior_minimum;
    let mut table = Table::new(
        "Table 3: Average employment per store before and after the rise in the New Jersey minimum wage",
        vec![
            "Variable".into(),
            "PA".into(),
            "NJ".into(),
            "NJ - PA".into(),
            format!("Wage = ${prior:.2}"),
            format!("Wage ${:.2}-${:.2}", prior + 0.01, HIGH_WAGE - 0.01),
            format!("Wage >= ${HIGH_WAGE:.2}"),
            "Low - high".into(),
            "Midrange - high".into(),
        ],
    );

    table.push_row("1. FTE employment before, all available observations", before.cells());
    table.push_row("2. FTE employment after, all available observations", after.cells());
    table.push_row("3. Change in mean FTE employment", change.cells());
    table.push_row(
        "4. Change in mean FTE employment, balanced sample of stores",
        balanced_change.cells(),
    );
    table.push_row(
        "5. Change in mean FTE employment, setting FTE at temporarily closed stores to 0",
        zeroed_change.cells(),
    );

    table.footnote("Standard errors in parentheses.");
    table.footnote(format!(
        "Wage brackets use the wave-1 starting wage of New Jersey stores. \
         FTE counts part-time workers at {} of a full-time worker.",
        base.config().part_time_weight
    ));
    table.footnote(
        "Permanently closed stores count as zero employment after the rise. \
         Temporarily closed stores are excluded except in row 5.",
    );
    Ok(table)
}
