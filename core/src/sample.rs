//! Sample selection: immutable row sets over a `Dataset`.
//!
//! RULE: a `Sample` is never mutated. Refining one produces a new Sample with
//! a longer label. Predicates compose conjunctively.
//!
//! An empty selection is a valid Sample. Callers turn it into blank cells.

use crate::{
    dataset::{Dataset, WAGE_TOLERANCE},
    record::{Chain, Region, SecondWaveStatus, State},
    variable::Variable,
};
use std::{fmt, sync::Arc};

/// Wave-1 starting-wage bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WageBracket {
    /// Equal to the value, to the cent.
    Exactly(f64),
    /// `lo <= wage < hi`.
    Range { lo: f64, hi: f64 },
    AtLeast(f64),
}

impl WageBracket {
    pub fn contains(&self, wage: f64) -> bool {
        match *self {
            Self::Exactly(x) => (wage - x).abs() < WAGE_TOLERANCE,
            Self::Range { lo, hi } => wage >= lo - WAGE_TOLERANCE && wage < hi - WAGE_TOLERANCE,
            Self::AtLeast(x) => wage >= x - WAGE_TOLERANCE,
        }
    }
}

impl fmt::Display for WageBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(x) => write!(f, "wage = ${x:.2}"),
            Self::Range { lo, hi } => write!(f, "${lo:.2} <= wage < ${hi:.2}"),
            Self::AtLeast(x) => write!(f, "wage >= ${x:.2}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    State(State),
    ChainIn(Vec<Chain>),
    RegionIn(Vec<Region>),
    /// Drops stores coded as shore-area. An unrecorded shore code is kept.
    ExcludeShore,
    /// Valid FTE in both waves, after closure conventions.
    BalancedPanel,
    /// Valid employment change, and either closed in wave 2 or a valid wage
    /// change. The sample of the reduced-form regressions.
    AnalysisSample,
    HasValues(Vec<Variable>),
    /// A 0/1 variable equal to one. Missing never matches.
    Indicator(Variable),
    WageBracket(WageBracket),
    /// Bracket on the wave-2 starting wage.
    SecondWaveWage(WageBracket),
    MaxFirstWaveCalls(u32),
    /// Completed the wave-2 interview.
    Interviewed,
}

impl Predicate {
    pub fn matches(&self, dataset: &Dataset, row: usize) -> bool {
        let record = dataset.record(row);
        let derived = dataset.derived(row);
        match self {
            Self::State(state) => record.state == *state,
            Self::ChainIn(chains) => chains.contains(&record.chain),
            Self::RegionIn(regions) => record.region.is_some_and(|r| regions.contains(&r)),
            Self::ExcludeShore => record.shore != Some(true),
            Self::BalancedPanel => derived.fte_first.is_some() && derived.fte_second.is_some(),
            Self::AnalysisSample => {
                derived.employment_change.is_some()
                    && (derived.closed || derived.wage_change.is_some())
            }
            Self::HasValues(vars) => vars.iter().all(|&v| dataset.value(row, v).is_some()),
            Self::Indicator(variable) => dataset.value(row, *variable) == Some(1.0),
            Self::WageBracket(bracket) => record
                .first
                .starting_wage
                .is_some_and(|w| bracket.contains(w)),
            Self::SecondWaveWage(bracket) => record
                .second
                .starting_wage
                .is_some_and(|w| bracket.contains(w)),
            Self::MaxFirstWaveCalls(max) => record.first.calls.is_some_and(|c| c <= f64::from(*max)),
            Self::Interviewed => record.second_status == SecondWaveStatus::Interviewed,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::State(state) => state.abbreviation().to_string(),
            Self::ChainIn(chains) => {
                let names: Vec<&str> = chains.iter().map(|c| c.label()).collect();
                format!("chain in [{}]", names.join(", "))
            }
            Self::RegionIn(regions) => {
                let names: Vec<String> = regions.iter().map(|r| r.to_string()).collect();
                format!("region in [{}]", names.join(", "))
            }
            Self::ExcludeShore => "excludes shore-area stores".into(),
            Self::BalancedPanel => "balanced panel".into(),
            Self::AnalysisSample => "analysis sample".into(),
            Self::HasValues(vars) => {
                let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
                format!("non-missing {}", names.join(", "))
            }
            Self::Indicator(variable) => format!("{variable} = 1"),
            Self::WageBracket(bracket) => bracket.to_string(),
            Self::SecondWaveWage(bracket) => format!("wave-2 {bracket}"),
            Self::MaxFirstWaveCalls(max) => format!("wave-1 calls <= {max}"),
            Self::Interviewed => "interviewed in wave 2".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    label: String,
    rows: Arc<[usize]>,
}

impl Sample {
    /// Every record in the dataset.
    pub fn all(dataset: &Dataset) -> Self {
        Self {
            label: "all stores".into(),
            rows: (0..dataset.len()).collect(),
        }
    }

    /// Rows of `self` that also satisfy every predicate.
    pub fn refine(&self, dataset: &Dataset, predicates: &[Predicate]) -> Self {
        if predicates.is_empty() {
            return self.clone();
        }
        let rows: Arc<[usize]> = self
            .rows
            .iter()
            .copied()
            .filter(|&row| predicates.iter().all(|p| p.matches(dataset, row)))
            .collect();
        let labels: Vec<String> = predicates.iter().map(Predicate::label).collect();
        let label = if self.label == "all stores" {
            labels.join("; ")
        } else {
            format!("{}; {}", self.label, labels.join("; "))
        };
        if rows.is_empty() {
            log::debug!("sample: '{label}' selects no rows");
        }
        Self { label, rows }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-missing values of `variable` over this sample, in row order.
    pub fn values(&self, dataset: &Dataset, variable: Variable) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|&row| dataset.value(row, variable))
            .collect()
    }
}

pub fn select(dataset: &Dataset, predicates: &[Predicate]) -> Sample {
    Sample::all(dataset).refine(dataset, predicates)
}
