//! Derived economic variables.
//!
//! RULE: every function here is pure and total over `Record`, except that a
//! missing input yields a missing output. No default is ever substituted for
//! a missing source value.
//!
//! Policy knobs (part-time weight, wage target, how temporarily closed stores
//! count) travel in `DerivationConfig`. There is no process-wide setting.

use crate::{
    error::{SurveyError, SurveyResult},
    record::{Record, State, WaveObservation},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PART_TIME_WEIGHT: f64 = 0.5;
/// New Jersey's statutory minimum after the increase.
pub const DEFAULT_WAGE_TARGET: f64 = 5.05;
/// Federal minimum in force at wave 1.
pub const DEFAULT_PRIOR_MINIMUM: f64 = 4.25;

/// How wave-2 employment of a temporarily closed store is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempClosedPolicy {
    /// Wave-2 FTE is missing; the store drops out of change statistics.
    #[default]
    Missing,
    /// Wave-2 FTE is zero, as if the store had closed for good.
    Zero,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    pub part_time_weight: f64,
    pub wage_target: f64,
    pub prior_minimum: f64,
    pub temp_closed: TempClosedPolicy,
    pub include_managers: bool,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            part_time_weight: DEFAULT_PART_TIME_WEIGHT,
            wage_target: DEFAULT_WAGE_TARGET,
            prior_minimum: DEFAULT_PRIOR_MINIMUM,
            temp_closed: TempClosedPolicy::Missing,
            include_managers: true,
        }
    }
}

impl DerivationConfig {
    pub fn validate(&self) -> SurveyResult<()> {
        if !self.part_time_weight.is_finite() || !(0.0..=1.0).contains(&self.part_time_weight) {
            return Err(SurveyError::Configuration(format!(
                "part_time_weight must lie in [0, 1], got {}",
                self.part_time_weight
            )));
        }
        if !self.wage_target.is_finite() || self.wage_target <= 0.0 {
            return Err(SurveyError::Configuration(format!(
                "wage_target must be a positive wage, got {}",
                self.wage_target
            )));
        }
        if !self.prior_minimum.is_finite() || self.prior_minimum <= 0.0 {
            return Err(SurveyError::Configuration(format!(
                "prior_minimum must be a positive wage, got {}",
                self.prior_minimum
            )));
        }
        if self.prior_minimum >= self.wage_target {
            return Err(SurveyError::Configuration(format!(
                "prior_minimum ({}) must be below wage_target ({})",
                self.prior_minimum, self.wage_target
            )));
        }
        Ok(())
    }

    pub fn with_part_time_weight(mut self, weight: f64) -> Self {
        self.part_time_weight = weight;
        self
    }

    pub fn with_wage_target(mut self, target: f64) -> Self {
        self.wage_target = target;
        self
    }

    pub fn with_temp_closed(mut self, policy: TempClosedPolicy) -> Self {
        self.temp_closed = policy;
        self
    }

    pub fn without_managers(mut self) -> Self {
        self.include_managers = false;
        self
    }
}

// ── Employment ─────────────────────────────────────────────────

/// Full-time-equivalent employment: full-time + managers + w × part-time.
/// Missing if any component is missing or negative.
pub fn fte(obs: &WaveObservation, part_time_weight: f64, include_managers: bool) -> Option<f64> {
    let full_time = obs.full_time?;
    let part_time = obs.part_time?;
    let managers = if include_managers { obs.managers? } else { 0.0 };
    if full_time < 0.0 || part_time < 0.0 || managers < 0.0 {
        return None;
    }
    Some(full_time + managers + part_time_weight * part_time)
}

/// Wave-2 FTE with the closure conventions applied.
pub fn second_wave_fte(record: &Record, config: &DerivationConfig) -> Option<f64> {
    if record.second_status.is_permanently_closed() {
        return Some(0.0);
    }
    if record.second_status.is_temporarily_closed() {
        return match config.temp_closed {
            TempClosedPolicy::Missing => None,
            TempClosedPolicy::Zero => Some(0.0),
        };
    }
    fte(&record.second, config.part_time_weight, config.include_managers)
}

/// True when wave-2 employment is zero because the store closed.
pub fn closed_in_second_wave(record: &Record, config: &DerivationConfig) -> bool {
    record.second_status.is_permanently_closed()
        || (record.second_status.is_temporarily_closed()
            && config.temp_closed == TempClosedPolicy::Zero)
}

pub fn employment_change(first: Option<f64>, second: Option<f64>) -> Option<f64> {
    Some(second? - first?)
}

/// 2(e2 − e1)/(e2 + e1). A store with zero wave-2 employment counts as −1.
/// Missing when both waves are zero.
pub fn proportional_change(first: Option<f64>, second: Option<f64>) -> Option<f64> {
    let (e1, e2) = (first?, second?);
    let total = e1 + e2;
    if total <= 0.0 {
        return None;
    }
    if e2 == 0.0 {
        return Some(-1.0);
    }
    Some(2.0 * (e2 - e1) / total)
}

/// Share of FTE employment made up of full-time workers.
pub fn full_time_share(obs: &WaveObservation, fte: Option<f64>) -> Option<f64> {
    let fte = fte?;
    if fte <= 0.0 {
        return None;
    }
    Some(obs.full_time? / fte)
}

// ── Wages ──────────────────────────────────────────────────────

/// Proportional raise needed to bring the wave-1 starting wage up to `target`.
fn gap_to(wage: Option<f64>, target: f64) -> Option<f64> {
    let wage = wage?;
    if wage <= 0.0 {
        return None;
    }
    Some(((target - wage) / wage).max(0.0))
}

/// Wage gap. Zero for stores outside the treated jurisdiction, never negative.
pub fn wage_gap(record: &Record, target: f64) -> Option<f64> {
    match record.state {
        State::Pennsylvania => Some(0.0),
        State::NewJersey => gap_to(record.first.starting_wage, target),
    }
}

/// Gap computed as if every store faced `target`; used for falsification
/// tests on the untreated state.
pub fn placebo_wage_gap(record: &Record, target: f64) -> Option<f64> {
    gap_to(record.first.starting_wage, target)
}

pub fn wage_change(record: &Record) -> Option<f64> {
    Some(record.second.starting_wage? - record.first.starting_wage?)
}

// ── Prices ─────────────────────────────────────────────────────

/// Soda + fries + entree. Missing if any component is missing.
pub fn meal_price(obs: &WaveObservation) -> Option<f64> {
    Some(obs.soda? + obs.fries? + obs.entree?)
}

pub fn log_price_change(first: Option<f64>, second: Option<f64>) -> Option<f64> {
    let (p1, p2) = (first?, second?);
    if p1 <= 0.0 || p2 <= 0.0 {
        return None;
    }
    Some(p2.ln() - p1.ln())
}

// ── Other outcomes ─────────────────────────────────────────────

/// `after − before`, missing if either wave is missing.
pub fn wave_change(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    Some(after? - before?)
}

/// Change in the full-time share of FTE employment, in percentage points.
pub fn full_time_share_change(first: Option<f64>, second: Option<f64>) -> Option<f64> {
    wave_change(first, second).map(|d| d * 100.0)
}

/// Change in a 0/1 store characteristic, in percentage points.
pub fn indicator_change(before: Option<bool>, after: Option<bool>) -> Option<f64> {
    let as_pct = |b: bool| if b { 100.0 } else { 0.0 };
    Some(as_pct(after?) - as_pct(before?))
}

/// Slope of the starting-wage profile: the usual first raise spread over
/// the time to that raise, as percent of the starting wage per week.
/// Missing unless the time to raise and the wage are positive.
pub fn wage_slope(obs: &WaveObservation) -> Option<f64> {
    let months = obs.months_to_first_raise?;
    let raise = obs.first_raise?;
    let wage = obs.starting_wage?;
    if months <= 0.0 || wage <= 0.0 {
        return None;
    }
    let per_week = raise / months * (12.0 / 52.0);
    Some(per_week / wage * 100.0)
}

/// Per-record derived quantities, computed once per `DerivationConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedVariables {
    pub fte_first: Option<f64>,
    pub fte_second: Option<f64>,
    pub employment_change: Option<f64>,
    pub proportional_change: Option<f64>,
    pub wage_gap: Option<f64>,
    pub placebo_gap: Option<f64>,
    pub wage_change: Option<f64>,
    pub meal_price_first: Option<f64>,
    pub meal_price_second: Option<f64>,
    pub log_meal_change: Option<f64>,
    pub full_time_share_first: Option<f64>,
    pub full_time_share_second: Option<f64>,
    pub full_time_share_change: Option<f64>,
    pub closed: bool,
}

impl DerivedVariables {
    pub fn compute(record: &Record, config: &DerivationConfig) -> Self {
        let fte_first = fte(&record.first, config.part_time_weight, config.include_managers);
        let fte_second = second_wave_fte(record, config);
        let meal_price_first = meal_price(&record.first);
        let meal_price_second = meal_price(&record.second);
        let full_time_share_first = full_time_share(&record.first, fte_first);
        let full_time_share_second = full_time_share(&record.second, fte_second);

        Self {
            fte_first,
            fte_second,
            employment_change: employment_change(fte_first, fte_second),
            proportional_change: proportional_change(fte_first, fte_second),
            wage_gap: wage_gap(record, config.wage_target),
            placebo_gap: placebo_wage_gap(record, config.wage_target),
            wage_change: wage_change(record),
            meal_price_first,
            meal_price_second,
            log_meal_change: log_price_change(meal_price_first, meal_price_second),
            full_time_share_first,
            full_time_share_second,
            full_time_share_change: full_time_share_change(full_time_share_first, full_time_share_second),
            closed: closed_in_second_wave(record, config),
        }
    }
}
