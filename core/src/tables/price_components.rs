//! Prices of soda, fries and an entree, and of the full meal, before and
//! after the increase.
//!
//! Two change measures: the difference of wave means over every store with
//! a price, and the mean within-store change over the balanced sample of
//! stores with all three prices recorded in both waves.

use crate::{
    dataset::Dataset,
    derived::meal_price,
    error::SurveyResult,
    record::{State, WaveObservation},
    report::{blank_if_recoverable, difference_cell, stat_cell, Table},
    sample::{select, Predicate, Sample},
    stats::{change_between, difference, mean_and_se_of, StatResult},
};

const DECIMALS: usize = 3;

type Price = fn(&WaveObservation) -> Option<f64>;

fn soda(obs: &WaveObservation) -> Option<f64> {
    obs.soda
}

fn fries(obs: &WaveObservation) -> Option<f64> {
    obs.fries
}

fn entree(obs: &WaveObservation) -> Option<f64> {
    obs.entree
}

const ITEMS: [(&str, Price); 4] = [
    ("Soda", soda),
    ("French fries", fries),
    ("Entree", entree),
    ("Full meal (a)", meal_price),
];

fn wave_prices(dataset: &Dataset, sample: &Sample, price: Price, second: bool) -> Vec<f64> {
    sample
        .rows()
        .iter()
        .filter_map(|&row| {
            let record = dataset.record(row);
            price(if second { &record.second } else { &record.first })
        })
        .collect()
}

fn balanced_changes(dataset: &Dataset, sample: &Sample, price: Price) -> Vec<f64> {
    sample
        .rows()
        .iter()
        .map(|&row| dataset.record(row))
        .filter(|record| meal_price(&record.first).is_some() && meal_price(&record.second).is_some())
        .filter_map(|record| Some(price(&record.second)? - price(&record.first)?))
        .collect()
}

/// Before, after, change over all stores, change over the balanced sample.
fn periods(dataset: &Dataset, sample: &Sample, price: Price, context: &str) -> SurveyResult<[Option<StatResult>; 4]> {
    let before = blank_if_recoverable(mean_and_se_of(&wave_prices(dataset, sample, price, false), context))?;
    let after = blank_if_recoverable(mean_and_se_of(&wave_prices(dataset, sample, price, true), context))?;
    let change = match (&after, &before) {
        (Some(a), Some(b)) => Some(change_between(a, b)),
        _ => None,
    };
    let balanced = blank_if_recoverable(mean_and_se_of(&balanced_changes(dataset, sample, price), context))?;
    Ok([before, after, change, balanced])
}

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let pa = select(dataset, &[Predicate::State(State::Pennsylvania)]);
    let nj = select(dataset, &[Predicate::State(State::NewJersey)]);

    let mut table = Table::new(
        "Table 10: Price changes before and after the minimum-wage increase",
        vec![
            "Price".into(),
            "PA (i)".into(),
            "NJ (ii)".into(),
            "NJ - PA (iii)".into(),
        ],
    );

    const PERIODS: [&str; 4] = ["Wave 1", "Wave 2", "Change, all stores", "Change, balanced sample (b)"];
    for (item, price) in ITEMS {
        let pa_stats = periods(dataset, &pa, price, &format!("PA {item} price"))?;
        let nj_stats = periods(dataset, &nj, price, &format!("NJ {item} price"))?;
        table.push_row(format!("{item}:"), Vec::new());
        for ((label, pa_stat), nj_stat) in PERIODS.iter().zip(&pa_stats).zip(&nj_stats) {
            let gap = match (nj_stat, pa_stat) {
                (Some(a), Some(b)) => Some(difference(a, b)),
                _ => None,
            };
            table.push_row(
                *label,
                vec![
                    stat_cell(pa_stat.as_ref(), DECIMALS),
                    stat_cell(nj_stat.as_ref(), DECIMALS),
                    difference_cell(gap.as_ref(), DECIMALS),
                ],
            );
        }
    }

    table.footnote(
        "Standard errors in parentheses. Wave means use every store with the price recorded; \
         the all-stores change is the difference of the wave means.",
    );
    table.footnote("(a) Sum of the soda, fries and entree prices.");
    table.footnote("(b) Mean within-store change for stores with all three prices in both waves.");
    Ok(table)
}
