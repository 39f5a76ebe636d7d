//! Deterministic synthetic survey panels, for demos and tests.
//!
//! RULE: nothing here calls a platform RNG. Every draw flows through a
//! `SurveyRng` seeded from the caller's seed, so the same seed always yields
//! the same stores in the same order.
//!
//! Each concern (store attributes, wave 1, wave 2) gets its own stream,
//! derived from (seed XOR stream index). Adding a draw to one stream never
//! shifts the others.

use crate::{
    record::{
        Chain, Closure, MealProgram, Ownership, Record, Region, SecondWaveStatus, State,
        WaveObservation,
    },
    types::{StoreId, Wave},
};
use chrono::{Days, NaiveDate};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct SurveyRng {
    inner: Pcg64Mcg,
}

impl SurveyRng {
    pub fn new(seed: u64, stream: u64) -> Self {
        let derived_seed = seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Roll a u64 in [0, n). `n` of zero yields zero.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller normal draw.
    pub fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        mean + sd * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Pick by relative weight. Falls back to the last item.
    pub fn weighted<T: Copy>(&mut self, items: &[(T, f64)]) -> Option<T> {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(item, weight) in items {
            if roll < weight {
                return Some(item);
            }
            roll -= weight;
        }
        items.last().map(|&(item, _)| item)
    }
}

/// Stable stream assignments. Append only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
enum Stream {
    Store = 0,
    FirstWave = 1,
    SecondWave = 2,
    Operations = 3,
}

fn cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn halves(x: f64) -> f64 {
    ((x * 2.0).round() / 2.0).max(0.0)
}

fn first_interview_day() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1992, 11, 5)
}

/// A plausible two-wave NJ/PA panel of `stores` stores.
pub fn generate_survey(seed: u64, stores: usize) -> Vec<Record> {
    let mut store_rng = SurveyRng::new(seed, Stream::Store as u64);
    let mut first_rng = SurveyRng::new(seed, Stream::FirstWave as u64);
    let mut second_rng = SurveyRng::new(seed, Stream::SecondWave as u64);
    let mut ops_rng = SurveyRng::new(seed, Stream::Operations as u64);

    let records: Vec<Record> = (0..stores)
        .map(|i| {
            let sheet = StoreId::try_from(i + 1).unwrap_or(StoreId::MAX);
            let state = if store_rng.chance(0.8) { State::NewJersey } else { State::Pennsylvania };
            let mut builder = StoreBuilder::new(sheet, state);

            let chain = store_rng
                .weighted(&[
                    (Chain::BurgerKing, 0.42),
                    (Chain::Kfc, 0.20),
                    (Chain::RoyRogers, 0.24),
                    (Chain::Wendys, 0.14),
                ])
                .unwrap_or(Chain::BurgerKing);
            builder = builder.chain(chain);
            if store_rng.chance(0.35) {
                builder = builder.company_owned();
            }
            let region = match state {
                State::NewJersey => store_rng.weighted(&[
                    (Region::SouthJersey, 0.3),
                    (Region::CentralJersey, 0.3),
                    (Region::NorthJersey, 0.4),
                ]),
                State::Pennsylvania => {
                    store_rng.weighted(&[(Region::Pennsylvania1, 0.5), (Region::Pennsylvania2, 0.5)])
                }
            };
            if let Some(region) = region {
                builder = builder.region(region);
            }
            if state == State::NewJersey && store_rng.chance(0.1) {
                builder = builder.shore();
            }

            // Wave 1.
            let wage1 = if first_rng.chance(0.3) {
                4.25
            } else {
                cents(first_rng.uniform(4.26, 5.25))
            };
            let full_time = halves(first_rng.normal(8.0, 6.0));
            let part_time = halves(first_rng.normal(18.0, 8.0));
            let managers = halves(first_rng.normal(3.4, 1.0));
            let (soda, fries, entree) = (
                cents(first_rng.uniform(0.85, 1.20)),
                cents(first_rng.uniform(0.75, 1.10)),
                cents(first_rng.uniform(1.20, 2.60)),
            );
            builder = builder
                .calls(Wave::First, 1 + first_rng.next_u64_below(4) as u32)
                .employment(Wave::First, full_time, part_time, managers)
                .wage(Wave::First, wage1)
                .prices(Wave::First, soda, fries, entree);

            // Wave 2.
            let treated = state == State::NewJersey;
            let wage2 = if treated {
                cents(wage1.max(5.05) + second_rng.uniform(0.0, 0.05))
            } else {
                cents(wage1 + second_rng.uniform(0.0, 0.08))
            };
            let inflation = if treated { 1.04 } else { 1.01 };
            builder = builder
                .calls(Wave::Second, 1 + second_rng.next_u64_below(3) as u32)
                .employment(
                    Wave::Second,
                    halves(full_time + second_rng.normal(0.0, 3.0)),
                    halves(part_time + second_rng.normal(0.0, 4.0)),
                    managers,
                )
                .wage(Wave::Second, wage2)
                .prices(
                    Wave::Second,
                    cents(soda * inflation),
                    cents(fries * inflation),
                    cents(entree * (inflation + second_rng.normal(0.0, 0.02))),
                )
                .interview_after(second_rng.next_u64_below(35));

            // Hours, registers, meal programs, raises. Own stream.
            let hours = halves(ops_rng.uniform(12.0, 18.0));
            let registers = 2 + ops_rng.next_u64_below(4) as u32;
            let open_at_11 = registers.saturating_sub(ops_rng.next_u64_below(2) as u32);
            let programs = [
                (MealProgram::None, 0.15),
                (MealProgram::Free, 0.10),
                (MealProgram::ReducedPrice, 0.55),
                (MealProgram::Both, 0.20),
            ];
            let months = ops_rng.uniform(8.0, 26.0).round();
            let raise = cents(ops_rng.uniform(0.05, 0.25));
            let registers2 = if ops_rng.chance(0.1) { registers + 1 } else { registers };
            builder = builder
                .hours_open(Wave::First, hours)
                .registers(Wave::First, registers, open_at_11)
                .meal_program(Wave::First, ops_rng.weighted(&programs).unwrap_or(MealProgram::None))
                .first_raise(Wave::First, months, raise)
                .bonus(ops_rng.chance(0.2))
                .hours_open(Wave::Second, halves(hours + ops_rng.normal(0.0, 0.5)))
                .registers(Wave::Second, registers2, open_at_11)
                .meal_program(Wave::Second, ops_rng.weighted(&programs).unwrap_or(MealProgram::None))
                .first_raise(Wave::Second, months + ops_rng.normal(0.0, 2.0).round(), raise)
                .special_program(ops_rng.chance(0.15));

            let status = second_rng.next_f64();
            builder = if status < 0.015 {
                builder.permanently_closed()
            } else if status < 0.03 {
                builder.temporarily_closed(Closure::Renovation)
            } else if status < 0.04 {
                builder.refused()
            } else {
                builder
            };
            builder.build()
        })
        .collect();

    log::info!("synthetic: generated {} stores (seed={seed})", records.len());
    records
}

/// Builds a single record for tests. Defaults: franchised Burger King,
/// 10 full-time, 10 part-time, 2 managers, $4.50 in both waves, interviewed.
pub struct StoreBuilder {
    record: Record,
}

impl StoreBuilder {
    pub fn new(sheet: StoreId, state: State) -> Self {
        let wave = WaveObservation {
            calls: Some(1.0),
            full_time: Some(10.0),
            part_time: Some(10.0),
            managers: Some(2.0),
            starting_wage: Some(4.50),
            meal_program: Some(MealProgram::None),
            soda: Some(1.00),
            fries: Some(0.90),
            entree: Some(1.80),
            ..WaveObservation::default()
        };
        let region = match state {
            State::NewJersey => Region::CentralJersey,
            State::Pennsylvania => Region::Pennsylvania1,
        };
        Self {
            record: Record {
                sheet,
                chain: Chain::BurgerKing,
                ownership: Ownership::Franchised,
                state,
                region: Some(region),
                shore: Some(false),
                bonus: None,
                pct_affected: None,
                first: wave.clone(),
                second: wave,
                second_status: SecondWaveStatus::Interviewed,
                second_interview: first_interview_day(),
                special_program: None,
            },
        }
    }

    fn wave_mut(&mut self, wave: Wave) -> &mut WaveObservation {
        match wave {
            Wave::First => &mut self.record.first,
            Wave::Second => &mut self.record.second,
        }
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.record.chain = chain;
        self
    }

    pub fn company_owned(mut self) -> Self {
        self.record.ownership = Ownership::CompanyOwned;
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.record.region = Some(region);
        self
    }

    pub fn shore(mut self) -> Self {
        self.record.shore = Some(true);
        self
    }

    /// Region and shore codes left unrecorded.
    pub fn unknown_location(mut self) -> Self {
        self.record.region = None;
        self.record.shore = None;
        self
    }

    pub fn calls(mut self, wave: Wave, calls: u32) -> Self {
        self.wave_mut(wave).calls = Some(f64::from(calls));
        self
    }

    pub fn employment(mut self, wave: Wave, full_time: f64, part_time: f64, managers: f64) -> Self {
        let obs = self.wave_mut(wave);
        obs.full_time = Some(full_time);
        obs.part_time = Some(part_time);
        obs.managers = Some(managers);
        self
    }

    pub fn wage(mut self, wave: Wave, wage: f64) -> Self {
        self.wave_mut(wave).starting_wage = Some(wage);
        self
    }

    pub fn missing_wage(mut self, wave: Wave) -> Self {
        self.wave_mut(wave).starting_wage = None;
        self
    }

    pub fn prices(mut self, wave: Wave, soda: f64, fries: f64, entree: f64) -> Self {
        let obs = self.wave_mut(wave);
        obs.soda = Some(soda);
        obs.fries = Some(fries);
        obs.entree = Some(entree);
        self
    }

    pub fn hours_open(mut self, wave: Wave, hours: f64) -> Self {
        self.wave_mut(wave).hours_open = Some(hours);
        self
    }

    pub fn registers(mut self, wave: Wave, registers: u32, open_at_11: u32) -> Self {
        let obs = self.wave_mut(wave);
        obs.registers = Some(f64::from(registers));
        obs.registers_at_11 = Some(f64::from(open_at_11));
        self
    }

    pub fn meal_program(mut self, wave: Wave, program: MealProgram) -> Self {
        self.wave_mut(wave).meal_program = Some(program);
        self
    }

    /// Usual first raise of `amount` dollars after `months` months.
    pub fn first_raise(mut self, wave: Wave, months: f64, amount: f64) -> Self {
        let obs = self.wave_mut(wave);
        obs.months_to_first_raise = Some(months.max(1.0));
        obs.first_raise = Some(amount);
        self
    }

    pub fn bonus(mut self, offered: bool) -> Self {
        self.record.bonus = Some(offered);
        self
    }

    pub fn special_program(mut self, offered: bool) -> Self {
        self.record.special_program = Some(offered);
        self
    }

    /// Wave-2 interview `days` after the first interview day.
    pub fn interview_after(mut self, days: u64) -> Self {
        self.record.second_interview =
            first_interview_day().and_then(|d| d.checked_add_days(Days::new(days)));
        self
    }

    /// Closed for good; wave-2 fields absent.
    pub fn permanently_closed(mut self) -> Self {
        self.record.second_status = SecondWaveStatus::PermanentlyClosed;
        self.record.second = WaveObservation::default();
        self
    }

    /// Closed for `reason` at wave 2; wave-2 fields absent.
    pub fn temporarily_closed(mut self, reason: Closure) -> Self {
        self.record.second_status = SecondWaveStatus::TemporarilyClosed(reason);
        self.record.second = WaveObservation::default();
        self
    }

    pub fn refused(mut self) -> Self {
        self.record.second_status = SecondWaveStatus::Refused;
        self.record.second = WaveObservation::default();
        self.record.second_interview = None;
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}
