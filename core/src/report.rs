//! Text rendering of result tables.
//!
//! RULE: no computation happens here. Values arrive already estimated; this
//! module only formats them. A missing value is always an empty cell.

use crate::{
    error::{SurveyError, SurveyResult},
    regression::RegressionResult,
    stats::{Difference, Proportion, StatResult},
    variable::Variable,
};
use serde::Serialize;
use std::path::Path;

/// Fixed-point text, blank for missing. Never prints "-0.00".
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let half_unit = 0.5 * 10f64.powi(-(decimals as i32));
            let v = if v.abs() < half_unit { 0.0 } else { v };
            format!("{v:.decimals$}")
        }
        _ => String::new(),
    }
}

/// `"coef (se)"`, blank if either half is missing.
pub fn format_pair(estimate: Option<f64>, std_error: Option<f64>, decimals: usize) -> String {
    match (estimate, std_error) {
        (Some(_), Some(_)) => format!(
            "{} ({})",
            format_number(estimate, decimals),
            format_number(std_error, decimals)
        ),
        _ => String::new(),
    }
}

pub fn format_percent(pct: Option<f64>, decimals: usize) -> String {
    let text = format_number(pct, decimals);
    if text.is_empty() {
        text
    } else {
        format!("{text}%")
    }
}

/// Turn a recoverable failure into `None` (a blank cell). Anything else
/// aborts the table.
pub fn blank_if_recoverable<T>(result: SurveyResult<T>) -> SurveyResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_recoverable() => {
            log::warn!("report: blank cell: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn stat_cell(result: Option<&StatResult>, decimals: usize) -> String {
    result.map_or_else(String::new, |r| {
        format_pair(Some(r.estimate), Some(r.std_error), decimals)
    })
}

pub fn difference_cell(result: Option<&Difference>, decimals: usize) -> String {
    result.map_or_else(String::new, |d| {
        format_pair(Some(d.diff), Some(d.se_diff), decimals)
    })
}

pub fn proportion_cell(result: &Proportion, decimals: usize) -> String {
    match result.std_error {
        Some(se) => format_pair(Some(result.pct), Some(se), decimals),
        None => format_number(Some(result.pct), decimals),
    }
}

pub fn coefficient_cell(result: Option<&RegressionResult>, variable: Variable, decimals: usize) -> String {
    result
        .and_then(|r| r.coefficient(variable))
        .map_or_else(String::new, |c| {
            format_pair(Some(c.estimate), Some(c.std_error), decimals)
        })
}

pub fn yes_no(flag: bool) -> String {
    let word = if flag { "yes" } else { "no" };
    word.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub label: String,
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(label: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub footnotes: Vec<String>,
}

impl Table {
    pub fn new(title: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
            footnotes: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with blank cells.
    pub fn push_row(&mut self, label: impl Into<String>, mut cells: Vec<String>) {
        let width = self.columns.len().saturating_sub(1);
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        self.rows.push(Row::new(label, cells));
    }

    pub fn footnote(&mut self, note: impl Into<String>) {
        self.footnotes.push(note.into());
    }

    /// Header block, pipe-delimited body with aligned columns, footnotes.
    pub fn render(&self) -> String {
        let ncols = self
            .rows
            .iter()
            .map(|r| r.cells.len() + 1)
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0);

        let line_cells = |row: &Row| -> Vec<String> {
            std::iter::once(row.label.clone())
                .chain(row.cells.iter().cloned())
                .collect()
        };

        let mut widths = vec![3usize; ncols];
        for (i, header) in self.columns.iter().enumerate() {
            widths[i] = widths[i].max(header.chars().count());
        }
        for row in &self.rows {
            for (i, cell) in line_cells(row).iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| -> String {
            let padded: Vec<String> = (0..ncols)
                .map(|i| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:<width$}", width = widths[i])
                })
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut out = String::new();
        out.push_str(&self.title);
        out.push_str("\n\n");
        out.push_str(&format_line(&self.columns));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&format!("|-{}-|", rule.join("-|-")));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_line(&line_cells(row)));
            out.push('\n');
        }
        if !self.footnotes.is_empty() {
            out.push('\n');
            for note in &self.footnotes {
                out.push_str(note);
                out.push('\n');
            }
        }
        out
    }

    pub fn to_json(&self) -> SurveyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the rendered table. The file handle never outlives this call.
pub fn write_report(path: impl AsRef<Path>, table: &Table) -> SurveyResult<()> {
    let path = path.as_ref();
    std::fs::write(path, table.render()).map_err(|e| {
        SurveyError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot write {}: {e}", path.display()),
        ))
    })?;
    log::info!("report: wrote '{}' to {}", table.title, path.display());
    Ok(())
}

pub fn write_json(path: impl AsRef<Path>, table: &Table) -> SurveyResult<()> {
    let path = path.as_ref();
    std::fs::write(path, table.to_json()?)?;
    Ok(())
}
