//! Reduced-form models for the change in the price of a full meal.

use super::reduced_form::{five_model_table, model_footnotes, sample_note};
use crate::{
    dataset::Dataset,
    error::SurveyResult,
    report::Table,
    sample::{select, Predicate},
    variable::Variable,
};

pub fn build(dataset: &Dataset) -> SurveyResult<Table> {
    let sample = select(
        dataset,
        &[
            Predicate::Interviewed,
            Predicate::HasValues(vec![
                Variable::LogMealPriceChange,
                Variable::FteFirst,
                Variable::FteSecond,
                Variable::WageFirst,
                Variable::WageSecond,
            ]),
        ],
    );
    let (mut table, fits) = five_model_table(
        "Table 7: Reduced-form models for change in the price of a full meal",
        dataset,
        &sample,
        Variable::LogMealPriceChange,
        3,
    )?;
    table.footnote(sample_note(
        &fits,
        "the change in the log price of a full meal (soda, fries, entree)",
        3,
    ));
    table.footnote("Sample: stores interviewed in both waves with valid prices, employment and wages.");
    model_footnotes(&mut table, dataset.config().wage_target);
    Ok(table)
}
