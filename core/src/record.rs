//! Typed survey record: one store observed in two waves.
//!
//! RULE: a Record is validated once, when it is built from a parsed line.
//! Downstream code never re-checks codes or field presence.
//!
//! Wave-1 fields are always present as a `WaveObservation`, but individual
//! values may be missing. Wave-2 values of a temporarily closed store are
//! missing; those of a permanently closed store are treated as zero by the
//! derived-variable layer. The two cases are kept apart by `SecondWaveStatus`.

use crate::{
    error::{SurveyError, SurveyResult},
    reader::RawRow,
    types::StoreId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names of one wave's observation block.
pub struct WaveColumns {
    pub calls: &'static str,
    pub full_time: &'static str,
    pub part_time: &'static str,
    pub managers: &'static str,
    pub starting_wage: &'static str,
    pub months_to_first_raise: &'static str,
    pub first_raise: &'static str,
    pub meal_program: &'static str,
    pub opening_hour: &'static str,
    pub hours_open: &'static str,
    pub soda: &'static str,
    pub fries: &'static str,
    pub entree: &'static str,
    pub registers: &'static str,
    pub registers_at_11: &'static str,
}

pub const FIRST_WAVE_COLUMNS: WaveColumns = WaveColumns {
    calls: "NCALLS",
    full_time: "EMPFT",
    part_time: "EMPPT",
    managers: "NMGRS",
    starting_wage: "WAGE_ST",
    months_to_first_raise: "INCTIME",
    first_raise: "FIRSTINC",
    meal_program: "MEAL",
    opening_hour: "OPEN",
    hours_open: "HRSOPEN",
    soda: "PSODA",
    fries: "PFRY",
    entree: "PENTREE",
    registers: "NREGS",
    registers_at_11: "NREGS11",
};

pub const SECOND_WAVE_COLUMNS: WaveColumns = WaveColumns {
    calls: "NCALLS2",
    full_time: "EMPFT2",
    part_time: "EMPPT2",
    managers: "NMGRS2",
    starting_wage: "WAGE_ST2",
    months_to_first_raise: "INCTIME2",
    first_raise: "FIRSTIN2",
    meal_program: "MEALS2",
    opening_hour: "OPEN2R",
    hours_open: "HRSOPEN2",
    soda: "PSODA2",
    fries: "PFRY2",
    entree: "PENTREE2",
    registers: "NREGS2",
    registers_at_11: "NREGS112",
};

/// Every field `Record::from_row` reads. A codebook lacking one is rejected.
pub const REQUIRED_FIELDS: [&str; 45] = [
    "SHEET", "CHAINr", "CO_OWNED", "STATEr", "SOUTHJ", "CENTRALJ", "NORTHJ", "PA1", "PA2",
    "SHORE", "NCALLS", "EMPFT", "EMPPT", "NMGRS", "WAGE_ST", "INCTIME", "FIRSTINC", "BONUS",
    "PCTAFF", "MEAL", "OPEN", "HRSOPEN", "PSODA", "PFRY", "PENTREE", "NREGS", "NREGS11",
    "STATUS2", "DATE2", "NCALLS2", "EMPFT2", "EMPPT2", "NMGRS2", "WAGE_ST2", "INCTIME2",
    "FIRSTIN2", "SPECIAL2", "MEALS2", "OPEN2R", "HRSOPEN2", "PSODA2", "PFRY2", "PENTREE2",
    "NREGS2", "NREGS112",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    NewJersey,
    Pennsylvania,
}

impl State {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::NewJersey),
            0 => Some(Self::Pennsylvania),
            _ => None,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::NewJersey => "NJ",
            Self::Pennsylvania => "PA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    BurgerKing,
    Kfc,
    RoyRogers,
    Wendys,
}

impl Chain {
    pub const ALL: [Chain; 4] = [Self::BurgerKing, Self::Kfc, Self::RoyRogers, Self::Wendys];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::BurgerKing),
            2 => Some(Self::Kfc),
            3 => Some(Self::RoyRogers),
            4 => Some(Self::Wendys),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BurgerKing => "Burger King",
            Self::Kfc => "KFC",
            Self::RoyRogers => "Roy Rogers",
            Self::Wendys => "Wendy's",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    CompanyOwned,
    Franchised,
}

/// Sub-state sampling area. PA1 and PA2 are the two eastern Pennsylvania areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    SouthJersey,
    CentralJersey,
    NorthJersey,
    Pennsylvania1,
    Pennsylvania2,
}

impl Region {
    const COLUMNS: [(&'static str, Region); 5] = [
        ("SOUTHJ", Region::SouthJersey),
        ("CENTRALJ", Region::CentralJersey),
        ("NORTHJ", Region::NorthJersey),
        ("PA1", Region::Pennsylvania1),
        ("PA2", Region::Pennsylvania2),
    ];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SouthJersey => "southern NJ",
            Self::CentralJersey => "central NJ",
            Self::NorthJersey => "northern NJ",
            Self::Pennsylvania1 => "PA area 1",
            Self::Pennsylvania2 => "PA area 2",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealProgram {
    None,
    Free,
    ReducedPrice,
    Both,
}

impl MealProgram {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Free),
            2 => Some(Self::ReducedPrice),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn offers_free_meals(&self) -> bool {
        matches!(self, Self::Free | Self::Both)
    }

    pub fn offers_reduced_price(&self) -> bool {
        matches!(self, Self::ReducedPrice | Self::Both)
    }

    pub fn offers_both(&self) -> bool {
        matches!(self, Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Closure {
    Renovation,
    HighwayConstruction,
    MallFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondWaveStatus {
    Refused,
    Interviewed,
    TemporarilyClosed(Closure),
    PermanentlyClosed,
}

impl SecondWaveStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Refused),
            1 => Some(Self::Interviewed),
            2 => Some(Self::TemporarilyClosed(Closure::Renovation)),
            3 => Some(Self::PermanentlyClosed),
            4 => Some(Self::TemporarilyClosed(Closure::HighwayConstruction)),
            5 => Some(Self::TemporarilyClosed(Closure::MallFire)),
            _ => None,
        }
    }

    pub fn is_temporarily_closed(&self) -> bool {
        matches!(self, Self::TemporarilyClosed(_))
    }

    pub fn is_permanently_closed(&self) -> bool {
        matches!(self, Self::PermanentlyClosed)
    }
}

/// What one wave of interviews recorded about a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveObservation {
    pub calls: Option<f64>,
    pub full_time: Option<f64>,
    pub part_time: Option<f64>,
    pub managers: Option<f64>,
    pub starting_wage: Option<f64>,
    pub months_to_first_raise: Option<f64>,
    pub first_raise: Option<f64>,
    pub meal_program: Option<MealProgram>,
    pub opening_hour: Option<f64>,
    pub hours_open: Option<f64>,
    pub soda: Option<f64>,
    pub fries: Option<f64>,
    pub entree: Option<f64>,
    pub registers: Option<f64>,
    pub registers_at_11: Option<f64>,
}

impl WaveObservation {
    fn from_row(row: &RawRow<'_>, columns: &WaveColumns) -> SurveyResult<Self> {
        let meal_program = match row.code(columns.meal_program)? {
            Some(code) => Some(MealProgram::from_code(code).ok_or_else(|| {
                row.error(columns.meal_program, format!("unknown meal program code {code}"))
            })?),
            None => None,
        };

        Ok(Self {
            calls: row.value(columns.calls),
            full_time: row.value(columns.full_time),
            part_time: row.value(columns.part_time),
            managers: row.value(columns.managers),
            starting_wage: row.value(columns.starting_wage),
            months_to_first_raise: row.value(columns.months_to_first_raise),
            first_raise: row.value(columns.first_raise),
            meal_program,
            opening_hour: row.value(columns.opening_hour),
            hours_open: row.value(columns.hours_open),
            soda: row.value(columns.soda),
            fries: row.value(columns.fries),
            entree: row.value(columns.entree),
            registers: row.value(columns.registers),
            registers_at_11: row.value(columns.registers_at_11),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub sheet: StoreId,
    pub chain: Chain,
    pub ownership: Ownership,
    pub state: State,
    pub region: Option<Region>,
    pub shore: Option<bool>,
    pub bonus: Option<bool>,
    pub pct_affected: Option<f64>,
    pub first: WaveObservation,
    pub second: WaveObservation,
    pub second_status: SecondWaveStatus,
    pub second_interview: Option<NaiveDate>,
    pub special_program: Option<bool>,
}

impl Record {
    /// Build a typed record from one parsed line. Every code is checked here.
    pub fn from_row(row: &RawRow<'_>) -> SurveyResult<Self> {
        let sheet = row.required_code("SHEET")?;
        let sheet = StoreId::try_from(sheet)
            .map_err(|_| row.error("SHEET", format!("invalid sheet number {sheet}")))?;

        let chain_code = row.required_code("CHAINr")?;
        let chain = Chain::from_code(chain_code)
            .ok_or_else(|| row.error("CHAINr", format!("unknown chain code {chain_code}")))?;

        let ownership = match row.required_code("CO_OWNED")? {
            1 => Ownership::CompanyOwned,
            0 => Ownership::Franchised,
            other => return Err(row.error("CO_OWNED", format!("expected 0 or 1, got {other}"))),
        };

        let state_code = row.required_code("STATEr")?;
        let state = State::from_code(state_code)
            .ok_or_else(|| row.error("STATEr", format!("unknown state code {state_code}")))?;

        let mut region = None;
        for (column, candidate) in Region::COLUMNS {
            if row.flag(column)? == Some(true) {
                if let Some(existing) = region {
                    return Err(row.error(
                        column,
                        format!("store already assigned to {existing}"),
                    ));
                }
                region = Some(candidate);
            }
        }

        let status_code = row.required_code("STATUS2")?;
        let second_status = SecondWaveStatus::from_code(status_code)
            .ok_or_else(|| row.error("STATUS2", format!("unknown status code {status_code}")))?;

        let second_interview = match row.code("DATE2")? {
            Some(raw) => Some(parse_interview_date(raw).ok_or_else(|| {
                row.error("DATE2", format!("{raw} is not a valid MMDDYY date"))
            })?),
            None => None,
        };

        Ok(Self {
            sheet,
            chain,
            ownership,
            state,
            region,
            shore: row.flag("SHORE")?,
            bonus: row.flag("BONUS")?,
            pct_affected: row.value("PCTAFF"),
            first: WaveObservation::from_row(row, &FIRST_WAVE_COLUMNS)?,
            second: WaveObservation::from_row(row, &SECOND_WAVE_COLUMNS)?,
            second_status,
            second_interview,
            special_program: row.flag("SPECIAL2")?,
        })
    }

    pub fn is_new_jersey(&self) -> bool {
        self.state == State::NewJersey
    }

    pub fn is_company_owned(&self) -> bool {
        self.ownership == Ownership::CompanyOwned
    }

    pub fn wave(&self, wave: crate::types::Wave) -> &WaveObservation {
        match wave {
            crate::types::Wave::First => &self.first,
            crate::types::Wave::Second => &self.second,
        }
    }
}

/// MMDDYY, two-digit years in the 1900s.
pub fn parse_interview_date(raw: i64) -> Option<NaiveDate> {
    if !(10_100..=123_199).contains(&raw) {
        return None;
    }
    let month = (raw / 10_000) as u32;
    let day = ((raw / 100) % 100) as u32;
    let year = 1900 + (raw % 100) as i32;
    NaiveDate::from_ymd_opt(year, month, day)
}
