//! Table assembly: shared dataset in, rendered `Table` out.
//!
//! RULE: each builder is a pure function of `&Dataset`. Builders never share
//! mutable state, so the runner may build several tables at once.
//!
//! A builder that needs another derivation policy (temporarily closed stores
//! as zero, another part-time weight) calls `Dataset::rederive`. The caller's
//! dataset is never touched.

pub mod employment;
pub mod extended;
pub mod means;
pub mod other_outcomes;
pub mod price_components;
pub mod prices;
pub mod reduced_form;
pub mod specification;

use crate::{
    dataset::Dataset,
    error::{SurveyError, SurveyResult},
    regression::{fit, RegressionResult, RegressionSpec},
    report::{blank_if_recoverable, Table},
    sample::Sample,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A reproducible table. Configuration files and the command line name a
/// table the same way: by key (`"employment"`), by number (`"3"`), or as
/// `"table 3"`. Serialised as the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TableId {
    /// Means of key variables by state.
    MeansByState,
    /// Average employment per store before and after the increase.
    Employment,
    /// Reduced-form models for the change in employment.
    ReducedForm,
    /// Specification tests of the reduced-form models.
    Specification,
    /// Effects on store characteristics, meal programs and the wage profile.
    OtherOutcomes,
    /// Reduced-form models for the change in meal prices.
    Prices,
    /// Employment models with a low-wage dummy or a squared gap.
    ExtendedModels,
    /// Soda, fries and entree prices before and after.
    PriceComponents,
}

impl TableId {
    pub const ALL: [TableId; 8] = [
        Self::MeansByState,
        Self::Employment,
        Self::ReducedForm,
        Self::Specification,
        Self::OtherOutcomes,
        Self::Prices,
        Self::ExtendedModels,
        Self::PriceComponents,
    ];

    /// Number of the table in the published study.
    pub fn number(&self) -> u8 {
        match self {
            Self::MeansByState => 2,
            Self::Employment => 3,
            Self::ReducedForm => 4,
            Self::Specification => 5,
            Self::OtherOutcomes => 6,
            Self::Prices => 7,
            Self::ExtendedModels => 9,
            Self::PriceComponents => 10,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::MeansByState => "means",
            Self::Employment => "employment",
            Self::ReducedForm => "reduced_form",
            Self::Specification => "specification",
            Self::OtherOutcomes => "other_outcomes",
            Self::Prices => "prices",
            Self::ExtendedModels => "extended_models",
            Self::PriceComponents => "price_components",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {}", self.number())
    }
}

impl FromStr for TableId {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let number = s.strip_prefix("table").map(str::trim_start).unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.key() == s || t.number().to_string() == number)
            .ok_or_else(|| {
                let known: Vec<String> = Self::ALL
                    .iter()
                    .map(|t| format!("{} ({})", t.number(), t.key()))
                    .collect();
                SurveyError::Configuration(format!(
                    "unknown table '{s}' (available: {})",
                    known.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for TableId {
    type Error = SurveyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TableId> for String {
    fn from(id: TableId) -> Self {
        id.key().to_string()
    }
}

pub fn build_table(id: TableId, dataset: &Dataset) -> SurveyResult<Table> {
    log::info!("tables: building {id} over {} records", dataset.len());
    let table = match id {
        TableId::MeansByState => means::build(dataset)?,
        TableId::Employment => employment::build(dataset)?,
        TableId::ReducedForm => reduced_form::build(dataset)?,
        TableId::Specification => specification::build(dataset)?,
        TableId::OtherOutcomes => other_outcomes::build(dataset)?,
        TableId::Prices => prices::build(dataset)?,
        TableId::ExtendedModels => extended::build(dataset)?,
        TableId::PriceComponents => price_components::build(dataset)?,
    };
    log::info!("tables: {id} has {} rows", table.rows.len());
    Ok(table)
}

/// Fit, or `None` when the sample cannot support the model.
pub(crate) fn try_fit(
    dataset: &Dataset,
    sample: &Sample,
    spec: &RegressionSpec,
) -> SurveyResult<Option<RegressionResult>> {
    blank_if_recoverable(fit(dataset, sample, spec))
}
