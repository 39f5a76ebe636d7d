//! Named columns that statistics and regressions can read from a `Dataset`.
//!
//! Replaces loosely-typed column lookups: every readable quantity is a
//! variant here, with one stable snake-case name used in configuration,
//! logs, and regression output.

use crate::error::SurveyError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unit of a variable. Regression coefficients on a dependent variable
/// are read in these units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// Counts or dollars.
    Level,
    /// Ratio, e.g. 0.10 for ten percent.
    Proportion,
    /// Difference of natural logs.
    Log,
    /// Percentage points.
    Percent,
    /// 0/1 dummy.
    Indicator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    FteFirst,
    FteSecond,
    EmploymentChange,
    ProportionalChange,
    WageGap,
    WageGapSquared,
    PlaceboGap,
    NewJersey,
    BurgerKing,
    Kfc,
    RoyRogers,
    Wendys,
    CompanyOwned,
    SouthJersey,
    CentralJersey,
    NorthJersey,
    Pennsylvania1,
    Pennsylvania2,
    Shore,
    WageFirst,
    WageSecond,
    WageChange,
    MealPriceFirst,
    MealPriceSecond,
    LogMealPriceChange,
    FullTimeShareFirst,
    FullTimeShareSecond,
    AtPriorMinimumNj,
    HoursOpenFirst,
    HoursOpenSecond,
    RecruitingBonus,
    SpecialProgram,
    FullTimeShareChange,
    HoursOpenChange,
    RegistersChange,
    RegistersAt11Change,
    LowPriceMealChange,
    FreeMealChange,
    ComboMealChange,
    FirstRaiseTimeChange,
    FirstRaiseAmountChange,
    WageSlopeChange,
    InterviewWeek1,
    InterviewWeek2,
    InterviewWeek3,
    Closed,
}

impl Variable {
    pub const ALL: [Variable; 46] = [
        Self::FteFirst,
        Self::FteSecond,
        Self::EmploymentChange,
        Self::ProportionalChange,
        Self::WageGap,
        Self::WageGapSquared,
        Self::PlaceboGap,
        Self::NewJersey,
        Self::BurgerKing,
        Self::Kfc,
        Self::RoyRogers,
        Self::Wendys,
        Self::CompanyOwned,
        Self::SouthJersey,
        Self::CentralJersey,
        Self::NorthJersey,
        Self::Pennsylvania1,
        Self::Pennsylvania2,
        Self::Shore,
        Self::WageFirst,
        Self::WageSecond,
        Self::WageChange,
        Self::MealPriceFirst,
        Self::MealPriceSecond,
        Self::LogMealPriceChange,
        Self::FullTimeShareFirst,
        Self::FullTimeShareSecond,
        Self::AtPriorMinimumNj,
        Self::HoursOpenFirst,
        Self::HoursOpenSecond,
        Self::RecruitingBonus,
        Self::SpecialProgram,
        Self::FullTimeShareChange,
        Self::HoursOpenChange,
        Self::RegistersChange,
        Self::RegistersAt11Change,
        Self::LowPriceMealChange,
        Self::FreeMealChange,
        Self::ComboMealChange,
        Self::FirstRaiseTimeChange,
        Self::FirstRaiseAmountChange,
        Self::WageSlopeChange,
        Self::InterviewWeek1,
        Self::InterviewWeek2,
        Self::InterviewWeek3,
        Self::Closed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FteFirst => "fte_1",
            Self::FteSecond => "fte_2",
            Self::EmploymentChange => "fte_change",
            Self::ProportionalChange => "fte_pct_change",
            Self::WageGap => "gap",
            Self::WageGapSquared => "gap_sq",
            Self::PlaceboGap => "placebo_gap",
            Self::NewJersey => "nj",
            Self::BurgerKing => "bk",
            Self::Kfc => "kfc",
            Self::RoyRogers => "roys",
            Self::Wendys => "wendys",
            Self::CompanyOwned => "co_owned",
            Self::SouthJersey => "southj",
            Self::CentralJersey => "centralj",
            Self::NorthJersey => "northj",
            Self::Pennsylvania1 => "pa1",
            Self::Pennsylvania2 => "pa2",
            Self::Shore => "shore",
            Self::WageFirst => "wage_1",
            Self::WageSecond => "wage_2",
            Self::WageChange => "wage_change",
            Self::MealPriceFirst => "meal_1",
            Self::MealPriceSecond => "meal_2",
            Self::LogMealPriceChange => "log_meal_change",
            Self::FullTimeShareFirst => "ft_share_1",
            Self::FullTimeShareSecond => "ft_share_2",
            Self::AtPriorMinimumNj => "nj_low_wage",
            Self::HoursOpenFirst => "hours_open_1",
            Self::HoursOpenSecond => "hours_open_2",
            Self::RecruitingBonus => "bonus",
            Self::SpecialProgram => "special_2",
            Self::FullTimeShareChange => "ft_share_change",
            Self::HoursOpenChange => "hours_open_change",
            Self::RegistersChange => "registers_change",
            Self::RegistersAt11Change => "registers_11_change",
            Self::LowPriceMealChange => "low_price_meal_change",
            Self::FreeMealChange => "free_meal_change",
            Self::ComboMealChange => "combo_meal_change",
            Self::FirstRaiseTimeChange => "raise_time_change",
            Self::FirstRaiseAmountChange => "raise_amount_change",
            Self::WageSlopeChange => "wage_slope_change",
            Self::InterviewWeek1 => "week_1",
            Self::InterviewWeek2 => "week_2",
            Self::InterviewWeek3 => "week_3",
            Self::Closed => "closed",
        }
    }

    pub fn units(&self) -> Units {
        match self {
            Self::FteFirst
            | Self::FteSecond
            | Self::EmploymentChange
            | Self::WageFirst
            | Self::WageSecond
            | Self::WageChange
            | Self::MealPriceFirst
            | Self::MealPriceSecond
            | Self::HoursOpenFirst
            | Self::HoursOpenSecond
            | Self::HoursOpenChange
            | Self::RegistersChange
            | Self::RegistersAt11Change
            | Self::FirstRaiseTimeChange
            | Self::FirstRaiseAmountChange => Units::Level,
            Self::ProportionalChange
            | Self::WageGap
            | Self::WageGapSquared
            | Self::PlaceboGap
            | Self::FullTimeShareFirst
            | Self::FullTimeShareSecond => Units::Proportion,
            Self::LogMealPriceChange => Units::Log,
            Self::FullTimeShareChange
            | Self::LowPriceMealChange
            | Self::FreeMealChange
            | Self::ComboMealChange
            | Self::WageSlopeChange => Units::Percent,
            Self::NewJersey
            | Self::BurgerKing
            | Self::Kfc
            | Self::RoyRogers
            | Self::Wendys
            | Self::CompanyOwned
            | Self::SouthJersey
            | Self::CentralJersey
            | Self::NorthJersey
            | Self::Pennsylvania1
            | Self::Pennsylvania2
            | Self::Shore
            | Self::AtPriorMinimumNj
            | Self::RecruitingBonus
            | Self::SpecialProgram
            | Self::InterviewWeek1
            | Self::InterviewWeek2
            | Self::InterviewWeek3
            | Self::Closed => Units::Indicator,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name() == s)
            .ok_or_else(|| SurveyError::UnknownVariable { name: s.to_string() })
    }
}
