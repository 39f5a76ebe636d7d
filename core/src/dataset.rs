//! The parsed survey plus one set of derived variables.
//!
//! RULE: records are immutable and shared (`Arc<[Record]>`). A different
//! `DerivationConfig` produces a different `Dataset` over the same records;
//! nothing is recomputed in place.

use crate::{
    derived::{indicator_change, wage_slope, wave_change, DerivationConfig, DerivedVariables},
    error::SurveyResult,
    record::{Chain, MealProgram, Region, Record},
    variable::Variable,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[Record]>,
    derived: Vec<DerivedVariables>,
    config: DerivationConfig,
    first_interview: Option<NaiveDate>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, config: DerivationConfig) -> SurveyResult<Self> {
        Self::from_shared(records.into(), config)
    }

    pub fn from_shared(records: Arc<[Record]>, config: DerivationConfig) -> SurveyResult<Self> {
        config.validate()?;
        let derived: Vec<DerivedVariables> = records
            .iter()
            .map(|r| DerivedVariables::compute(r, &config))
            .collect();
        let first_interview = records.iter().filter_map(|r| r.second_interview).min();

        log::info!(
            "dataset: derived {} records (part_time_weight={}, wage_target={}, temp_closed={:?}, managers={})",
            records.len(),
            config.part_time_weight,
            config.wage_target,
            config.temp_closed,
            config.include_managers
        );

        Ok(Self {
            records,
            derived,
            config,
            first_interview,
        })
    }

    /// Same records, another derivation policy.
    pub fn rederive(&self, config: DerivationConfig) -> SurveyResult<Self> {
        Self::from_shared(Arc::clone(&self.records), config)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn shared_records(&self) -> Arc<[Record]> {
        Arc::clone(&self.records)
    }

    pub fn record(&self, row: usize) -> &Record {
        &self.records[row]
    }

    pub fn derived(&self, row: usize) -> &DerivedVariables {
        &self.derived[row]
    }

    pub fn config(&self) -> &DerivationConfig {
        &self.config
    }

    /// Whole weeks between this store's wave-2 interview and the earliest one.
    pub fn interview_week(&self, row: usize) -> Option<i64> {
        let first = self.first_interview?;
        let date = self.records[row].second_interview?;
        Some((date - first).num_days() / 7)
    }

    /// Value of `variable` for the record at `row`. Missing stays missing.
    pub fn value(&self, row: usize, variable: Variable) -> Option<f64> {
        let record = &self.records[row];
        let derived = &self.derived[row];
        let indicator = |b: bool| Some(if b { 1.0 } else { 0.0 });
        // An unrecorded region leaves every region dummy missing.
        let region = |r: Region| record.region.map(|own| if own == r { 1.0 } else { 0.0 });
        let chain = |c: Chain| indicator(record.chain == c);
        let week = |pred: fn(i64) -> bool| self.interview_week(row).map(|w| if pred(w) { 1.0 } else { 0.0 });
        let (first, second) = (&record.first, &record.second);
        let meal_change = |offers: fn(&MealProgram) -> bool| {
            indicator_change(
                first.meal_program.as_ref().map(offers),
                second.meal_program.as_ref().map(offers),
            )
        };

        match variable {
            Variable::FteFirst => derived.fte_first,
            Variable::FteSecond => derived.fte_second,
            Variable::EmploymentChange => derived.employment_change,
            Variable::ProportionalChange => derived.proportional_change,
            Variable::WageGap => derived.wage_gap,
            Variable::WageGapSquared => derived.wage_gap.map(|g| g * g),
            Variable::PlaceboGap => derived.placebo_gap,
            Variable::NewJersey => indicator(record.is_new_jersey()),
            Variable::BurgerKing => chain(Chain::BurgerKing),
            Variable::Kfc => chain(Chain::Kfc),
            Variable::RoyRogers => chain(Chain::RoyRogers),
            Variable::Wendys => chain(Chain::Wendys),
            Variable::CompanyOwned => indicator(record.is_company_owned()),
            Variable::SouthJersey => region(Region::SouthJersey),
            Variable::CentralJersey => region(Region::CentralJersey),
            Variable::NorthJersey => region(Region::NorthJersey),
            Variable::Pennsylvania1 => region(Region::Pennsylvania1),
            Variable::Pennsylvania2 => region(Region::Pennsylvania2),
            Variable::Shore => record.shore.and_then(indicator),
            Variable::WageFirst => record.first.starting_wage,
            Variable::WageSecond => record.second.starting_wage,
            Variable::WageChange => derived.wage_change,
            Variable::MealPriceFirst => derived.meal_price_first,
            Variable::MealPriceSecond => derived.meal_price_second,
            Variable::LogMealPriceChange => derived.log_meal_change,
            Variable::FullTimeShareFirst => derived.full_time_share_first,
            Variable::FullTimeShareSecond => derived.full_time_share_second,
            Variable::AtPriorMinimumNj => {
                if !record.is_new_jersey() {
                    return Some(0.0);
                }
                let wage = first.starting_wage?;
                indicator((wage - self.config.prior_minimum).abs() < WAGE_TOLERANCE)
            }
            Variable::HoursOpenFirst => first.hours_open,
            Variable::HoursOpenSecond => second.hours_open,
            Variable::RecruitingBonus => record.bonus.and_then(indicator),
            Variable::SpecialProgram => record.special_program.and_then(indicator),
            Variable::FullTimeShareChange => derived.full_time_share_change,
            Variable::HoursOpenChange => wave_change(first.hours_open, second.hours_open),
            Variable::RegistersChange => wave_change(first.registers, second.registers),
            Variable::RegistersAt11Change => {
                wave_change(first.registers_at_11, second.registers_at_11)
            }
            Variable::LowPriceMealChange => meal_change(MealProgram::offers_reduced_price),
            Variable::FreeMealChange => meal_change(MealProgram::offers_free_meals),
            Variable::ComboMealChange => meal_change(MealProgram::offers_both),
            Variable::FirstRaiseTimeChange => {
                wave_change(first.months_to_first_raise, second.months_to_first_raise)
            }
            Variable::FirstRaiseAmountChange => wave_change(first.first_raise, second.first_raise),
            Variable::WageSlopeChange => wave_change(wage_slope(first), wage_slope(second)),
            Variable::InterviewWeek1 => week(|w| w == 1),
            Variable::InterviewWeek2 => week(|w| w == 2),
            Variable::InterviewWeek3 => week(|w| w >= 3),
            Variable::Closed => indicator(derived.closed),
        }
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut chains = BTreeMap::new();
        for chain in Chain::ALL {
            chains.insert(chain.label().to_string(), 0);
        }
        let mut summary = DatasetSummary {
            total: self.len(),
            chains,
            ..DatasetSummary::default()
        };

        for (record, derived) in self.records.iter().zip(&self.derived) {
            if record.is_new_jersey() {
                summary.new_jersey += 1;
            } else {
                summary.pennsylvania += 1;
            }
            *summary.chains.entry(record.chain.label().to_string()).or_insert(0) += 1;
            if record.second_status.is_permanently_closed() {
                summary.permanently_closed += 1;
            }
            if record.second_status.is_temporarily_closed() {
                summary.temporarily_closed += 1;
            }
            if derived.fte_first.is_none() {
                summary.missing_fte_first += 1;
            }
            if derived.fte_second.is_none() {
                summary.missing_fte_second += 1;
            }
        }
        summary
    }
}

/// Wages are recorded to the cent.
pub const WAGE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub new_jersey: usize,
    pub pennsylvania: usize,
    pub chains: BTreeMap<String, usize>,
    pub permanently_closed: usize,
    pub temporarily_closed: usize,
    pub missing_fte_first: usize,
    pub missing_fte_second: usize,
}
