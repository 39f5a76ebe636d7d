//! Derived variables: FTE employment, closure conventions, wage gap,
//! proportional change, meal prices, and the other-outcome changes.

use minwage_core::{
    dataset::Dataset,
    derived::{
        fte, full_time_share_change, indicator_change, log_price_change, meal_price,
        proportional_change, second_wave_fte, wage_gap, wage_slope, DerivationConfig,
        TempClosedPolicy,
    },
    error::SurveyError,
    record::{Closure, MealProgram, State, WaveObservation},
    synthetic::{generate_survey, StoreBuilder},
    types::Wave,
    variable::{Units, Variable},
};

fn obs(full_time: f64, part_time: f64, managers: f64) -> WaveObservation {
    WaveObservation {
        full_time: Some(full_time),
        part_time: Some(part_time),
        managers: Some(managers),
        ..WaveObservation::default()
    }
}

/// FTE = full-time + managers + w x part-time.
#[test]
fn fte_weights_part_time() {
    let o = obs(10.0, 20.0, 3.0);
    assert_eq!(fte(&o, 0.5, true), Some(23.0));
    assert_eq!(fte(&o, 0.4, true), Some(21.0));
    assert_eq!(fte(&o, 0.5, false), Some(20.0), "managers excluded");
}

/// Any missing component makes FTE missing; nothing defaults to zero.
#[test]
fn fte_missing_component_propagates() {
    let mut o = obs(10.0, 20.0, 3.0);
    o.part_time = None;
    assert_eq!(fte(&o, 0.5, true), None);

    let mut o = obs(10.0, 20.0, 3.0);
    o.managers = None;
    assert_eq!(fte(&o, 0.5, true), None);
    assert_eq!(fte(&o, 0.5, false), Some(20.0), "managers are not read when excluded");
}

/// Permanently closed stores have zero wave-2 FTE even with no wave-2 data.
#[test]
fn permanently_closed_is_zero() {
    let record = StoreBuilder::new(1, State::NewJersey).permanently_closed().build();
    let config = DerivationConfig::default();
    assert_eq!(second_wave_fte(&record, &config), Some(0.0));
    assert_eq!(
        second_wave_fte(&record, &config.with_temp_closed(TempClosedPolicy::Zero)),
        Some(0.0)
    );
}

/// Temporarily closed stores are missing by default, zero when configured.
#[test]
fn temporarily_closed_follows_policy() {
    let record = StoreBuilder::new(1, State::NewJersey)
        .temporarily_closed(Closure::HighwayConstruction)
        .build();
    let missing = DerivationConfig::default();
    let zero = DerivationConfig::default().with_temp_closed(TempClosedPolicy::Zero);
    assert_eq!(second_wave_fte(&record, &missing), None);
    assert_eq!(second_wave_fte(&record, &zero), Some(0.0));
}

/// FTE is never negative and exactly zero after a permanent closure.
#[test]
fn fte_nonnegative_over_generated_survey() {
    let dataset = Dataset::new(generate_survey(11, 400), DerivationConfig::default()).unwrap();
    for row in 0..dataset.len() {
        for variable in [Variable::FteFirst, Variable::FteSecond] {
            if let Some(v) = dataset.value(row, variable) {
                assert!(v >= 0.0, "row {row}: {variable} = {v}");
            }
        }
        if dataset.record(row).second_status.is_permanently_closed() {
            assert_eq!(dataset.value(row, Variable::FteSecond), Some(0.0));
        }
    }
}

/// The gap is never negative and is exactly zero in Pennsylvania.
#[test]
fn wage_gap_nonnegative_and_zero_for_pa() {
    let dataset = Dataset::new(generate_survey(12, 400), DerivationConfig::default()).unwrap();
    for row in 0..dataset.len() {
        let gap = dataset.value(row, Variable::WageGap);
        if let Some(g) = gap {
            assert!(g >= 0.0, "row {row}: negative gap {g}");
        }
        if dataset.record(row).state == State::Pennsylvania {
            assert_eq!(gap, Some(0.0), "row {row}: PA gap must be zero");
        }
    }
}

/// Gap from $4.25 to $5.05 is about 18.8%; above the target it is zero.
#[test]
fn wage_gap_values() {
    let low = StoreBuilder::new(1, State::NewJersey).wage(Wave::First, 4.25).build();
    let high = StoreBuilder::new(2, State::NewJersey).wage(Wave::First, 5.25).build();
    let pa = StoreBuilder::new(3, State::Pennsylvania).wage(Wave::First, 4.25).build();
    let missing = StoreBuilder::new(4, State::NewJersey).missing_wage(Wave::First).build();

    let gap = wage_gap(&low, 5.05).unwrap();
    assert!((gap - 0.8 / 4.25).abs() < 1e-12, "got {gap}");
    assert_eq!(wage_gap(&high, 5.05), Some(0.0));
    assert_eq!(wage_gap(&pa, 5.05), Some(0.0));
    assert_eq!(wage_gap(&missing, 5.05), None);
}

/// 2(e2 - e1)/(e2 + e1), -1 for a store that went to zero, missing when both are zero.
#[test]
fn proportional_change_edge_cases() {
    assert_eq!(proportional_change(Some(10.0), Some(12.0)), Some(2.0 * 2.0 / 22.0));
    assert_eq!(proportional_change(Some(10.0), Some(0.0)), Some(-1.0));
    assert_eq!(proportional_change(Some(0.0), Some(0.0)), None);
    assert_eq!(proportional_change(None, Some(5.0)), None);
}

/// Meal price is the sum of three components, missing if any is missing.
#[test]
fn meal_price_requires_all_components() {
    let mut o = WaveObservation {
        soda: Some(1.0),
        fries: Some(0.9),
        entree: Some(2.1),
        ..WaveObservation::default()
    };
    let total = meal_price(&o).unwrap();
    assert!((total - 4.0).abs() < 1e-12);
    o.fries = None;
    assert_eq!(meal_price(&o), None);
}

/// Log change is ln(p2) - ln(p1), missing for non-positive prices.
#[test]
fn log_price_change_values() {
    let change = log_price_change(Some(4.0), Some(4.4)).unwrap();
    assert!((change - (1.1f64).ln()).abs() < 1e-12);
    assert_eq!(log_price_change(Some(0.0), Some(4.4)), None);
}

/// Contradictory or out-of-range options are configuration errors.
#[test]
fn config_validation() {
    assert!(DerivationConfig::default().validate().is_ok());
    assert!(matches!(
        DerivationConfig::default().with_part_time_weight(1.5).validate(),
        Err(SurveyError::Configuration(_))
    ));
    assert!(matches!(
        DerivationConfig::default().with_wage_target(4.00).validate(),
        Err(SurveyError::Configuration(_))
    ));
    assert!(Dataset::new(Vec::new(), DerivationConfig::default().with_part_time_weight(-0.1)).is_err());
}

/// Re-deriving shares the records and leaves the original dataset untouched.
#[test]
fn rederive_is_independent() {
    let records = vec![
        StoreBuilder::new(1, State::NewJersey).build(),
        StoreBuilder::new(2, State::NewJersey)
            .temporarily_closed(Closure::MallFire)
            .build(),
    ];
    let base = Dataset::new(records, DerivationConfig::default()).unwrap();
    let zeroed = base
        .rederive(DerivationConfig::default().with_temp_closed(TempClosedPolicy::Zero))
        .unwrap();

    assert_eq!(base.value(1, Variable::FteSecond), None);
    assert_eq!(zeroed.value(1, Variable::FteSecond), Some(0.0));
    assert_eq!(base.config().temp_closed, TempClosedPolicy::Missing);
    assert!(std::sync::Arc::ptr_eq(&base.shared_records(), &zeroed.shared_records()));
}

/// Interview weeks count from the earliest wave-2 interview.
#[test]
fn interview_week_dummies() {
    let records = vec![
        StoreBuilder::new(1, State::NewJersey).interview_after(0).build(),
        StoreBuilder::new(2, State::NewJersey).interview_after(8).build(),
        StoreBuilder::new(3, State::NewJersey).interview_after(15).build(),
        StoreBuilder::new(4, State::NewJersey).interview_after(30).build(),
    ];
    let dataset = Dataset::new(records, DerivationConfig::default()).unwrap();
    let weeks: Vec<[Option<f64>; 3]> = (0..4)
        .map(|row| {
            [
                dataset.value(row, Variable::InterviewWeek1),
                dataset.value(row, Variable::InterviewWeek2),
                dataset.value(row, Variable::InterviewWeek3),
            ]
        })
        .collect();
    assert_eq!(weeks[0], [Some(0.0), Some(0.0), Some(0.0)]);
    assert_eq!(weeks[1], [Some(1.0), Some(0.0), Some(0.0)]);
    assert_eq!(weeks[2], [Some(0.0), Some(1.0), Some(0.0)]);
    assert_eq!(weeks[3], [Some(0.0), Some(0.0), Some(1.0)]);
}

/// The NJ low-wage indicator marks NJ stores at the old minimum only.
#[test]
fn low_wage_indicator() {
    let records = vec![
        StoreBuilder::new(1, State::NewJersey).wage(Wave::First, 4.25).build(),
        StoreBuilder::new(2, State::NewJersey).wage(Wave::First, 4.50).build(),
        StoreBuilder::new(3, State::Pennsylvania).wage(Wave::First, 4.25).build(),
    ];
    let dataset = Dataset::new(records, DerivationConfig::default()).unwrap();
    let flags: Vec<Option<f64>> = (0..3).map(|r| dataset.value(r, Variable::AtPriorMinimumNj)).collect();
    assert_eq!(flags, vec![Some(1.0), Some(0.0), Some(0.0)]);
}

/// Variable names parse back, and unknown names are reported.
#[test]
fn variable_names() {
    for variable in Variable::ALL {
        assert_eq!(variable.name().parse::<Variable>().unwrap(), variable);
    }
    assert!(matches!(
        "fte_3".parse::<Variable>(),
        Err(SurveyError::UnknownVariable { name }) if name == "fte_3"
    ));
    assert_eq!(Variable::LogMealPriceChange.units(), Units::Log);
    assert_eq!(Variable::ProportionalChange.units(), Units::Proportion);
}

/// The dataset summary counts states, chains, and closures.
#[test]
fn dataset_summary_counts() {
    let records = vec![
        StoreBuilder::new(1, State::NewJersey).build(),
        StoreBuilder::new(2, State::NewJersey).permanently_closed().build(),
        StoreBuilder::new(3, State::Pennsylvania)
            .temporarily_closed(Closure::Renovation)
            .build(),
    ];
    let summary = Dataset::new(records, DerivationConfig::default()).unwrap().summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.new_jersey, 2);
    assert_eq!(summary.pennsylvania, 1);
    assert_eq!(summary.chains["Burger King"], 3);
    assert_eq!(summary.chains["KFC"], 0);
    assert_eq!(summary.permanently_closed, 1);
    assert_eq!(summary.temporarily_closed, 1);
    assert_eq!(summary.missing_fte_second, 1);
}

/// Raise per week as percent of the starting wage; needs a positive time
/// to raise and a positive wage.
#[test]
fn wage_slope_values() {
    let profile = |months: f64, raise: f64, wage: f64| WaveObservation {
        months_to_first_raise: Some(months),
        first_raise: Some(raise),
        starting_wage: Some(wage),
        ..WaveObservation::default()
    };
    // 0.26 over 6 months: 0.26 / 26 weeks = 0.01 a week, 0.25% of $4.00.
    let slope = wage_slope(&profile(6.0, 0.26, 4.00)).unwrap();
    assert!((slope - 0.25).abs() < 1e-12, "slope = {slope}");
    assert_eq!(wage_slope(&profile(0.0, 0.26, 4.00)), None);
    assert_eq!(wage_slope(&profile(6.0, 0.26, 0.0)), None);
    assert_eq!(wage_slope(&WaveObservation::default()), None);
}

/// Indicator changes are in percentage points; shares move by 100x.
#[test]
fn indicator_and_share_changes() {
    assert_eq!(indicator_change(Some(false), Some(true)), Some(100.0));
    assert_eq!(indicator_change(Some(true), Some(false)), Some(-100.0));
    assert_eq!(indicator_change(Some(true), Some(true)), Some(0.0));
    assert_eq!(indicator_change(None, Some(true)), None);

    let change = full_time_share_change(Some(0.25), Some(0.40)).unwrap();
    assert!((change - 15.0).abs() < 1e-12);
    assert_eq!(full_time_share_change(Some(0.25), None), None);
}

/// Meal-program changes follow the program each wave reports: a combined
/// program counts as both low-price and free.
#[test]
fn meal_program_changes() {
    let records = vec![
        StoreBuilder::new(1, State::NewJersey)
            .meal_program(Wave::First, MealProgram::None)
            .meal_program(Wave::Second, MealProgram::Both)
            .build(),
        StoreBuilder::new(2, State::NewJersey)
            .meal_program(Wave::First, MealProgram::Free)
            .meal_program(Wave::Second, MealProgram::ReducedPrice)
            .build(),
        StoreBuilder::new(3, State::Pennsylvania)
            .meal_program(Wave::First, MealProgram::Both)
            .build(),
    ];
    let dataset = Dataset::new(records, DerivationConfig::default()).unwrap();
    let row = |r: usize| {
        [Variable::LowPriceMealChange, Variable::FreeMealChange, Variable::ComboMealChange]
            .map(|v| dataset.value(r, v))
    };
    assert_eq!(row(0), [Some(100.0), Some(100.0), Some(100.0)]);
    assert_eq!(row(1), [Some(100.0), Some(-100.0), Some(0.0)]);
    assert_eq!(row(2), [Some(-100.0), Some(-100.0), Some(-100.0)], "dropped the program");
}

/// Store-characteristic changes are wave 2 minus wave 1.
#[test]
fn store_characteristic_changes() {
    let record = StoreBuilder::new(1, State::NewJersey)
        .hours_open(Wave::First, 16.0)
        .hours_open(Wave::Second, 17.5)
        .registers(Wave::First, 3, 2)
        .registers(Wave::Second, 4, 4)
        .first_raise(Wave::First, 6.0, 0.20)
        .first_raise(Wave::Second, 9.0, 0.25)
        .build();
    let dataset = Dataset::new(vec![record], DerivationConfig::default()).unwrap();
    assert_eq!(dataset.value(0, Variable::HoursOpenChange), Some(1.5));
    assert_eq!(dataset.value(0, Variable::RegistersChange), Some(1.0));
    assert_eq!(dataset.value(0, Variable::RegistersAt11Change), Some(2.0));
    assert_eq!(dataset.value(0, Variable::FirstRaiseTimeChange), Some(3.0));
    let amount = dataset.value(0, Variable::FirstRaiseAmountChange).unwrap();
    assert!((amount - 0.05).abs() < 1e-12);
}
