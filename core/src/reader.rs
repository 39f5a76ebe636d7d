//! Flat-file reader: raw lines to typed `Record`s.
//!
//! Two input modes exist because the survey ships both as a
//! whitespace-tokenised file and as a fixed-column file. The caller picks one;
//! nothing here sniffs the format.
//!
//! A parse failure is fatal for that line only. `BadRecordPolicy` decides
//! whether the load skips the line or aborts.

use crate::{
    codebook::{Codebook, FieldKind, FieldSpec},
    error::{SurveyError, SurveyResult},
    record::Record,
    types::LineNo,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Whitespace,
    FixedWidth,
}

impl std::str::FromStr for InputMode {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whitespace" => Ok(Self::Whitespace),
            "fixed" | "fixed_width" => Ok(Self::FixedWidth),
            other => Err(SurveyError::Configuration(format!(
                "unknown input mode '{other}' (expected whitespace or fixed_width)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadRecordPolicy {
    #[default]
    Skip,
    Abort,
}

/// One line's decoded values, aligned with the codebook's field order.
pub struct RawRow<'a> {
    line: LineNo,
    values: Vec<Option<f64>>,
    index: &'a HashMap<&'a str, usize>,
}

impl<'a> RawRow<'a> {
    pub fn line(&self) -> LineNo {
        self.line
    }

    /// Decoded value, `None` when missing or when the layout lacks the field.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.index.get(name).and_then(|&i| self.values[i])
    }

    /// Integral value of a coded field.
    pub fn code(&self, name: &str) -> SurveyResult<Option<i64>> {
        match self.value(name) {
            None => Ok(None),
            Some(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
            Some(v) => Err(self.error(name, format!("expected an integer code, got {v}"))),
        }
    }

    pub fn required_code(&self, name: &str) -> SurveyResult<i64> {
        self.code(name)?
            .ok_or_else(|| self.error(name, "required value is missing"))
    }

    /// 0/1 indicator.
    pub fn flag(&self, name: &str) -> SurveyResult<Option<bool>> {
        match self.code(name)? {
            None => Ok(None),
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            Some(other) => Err(self.error(name, format!("expected 0 or 1, got {other}"))),
        }
    }

    pub fn error(&self, field: &str, reason: impl Into<String>) -> SurveyError {
        SurveyError::parse(self.line, field, reason)
    }
}

/// A validated codebook plus the chosen input mode.
pub struct RecordReader<'a> {
    codebook: &'a Codebook,
    mode: InputMode,
    index: HashMap<&'a str, usize>,
}

impl<'a> RecordReader<'a> {
    pub fn new(codebook: &'a Codebook, mode: InputMode) -> SurveyResult<Self> {
        codebook.validate(mode)?;
        let index = codebook
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), i))
            .collect();
        Ok(Self {
            codebook,
            mode,
            index,
        })
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn parse_line(&self, line: &str, line_no: LineNo) -> SurveyResult<Record> {
        let line = line.trim_end_matches(['\r', '\n']);
        let values = match self.mode {
            InputMode::Whitespace => self.split_tokens(line, line_no)?,
            InputMode::FixedWidth => self.slice_columns(line, line_no)?,
        };
        let row = RawRow {
            line: line_no,
            values,
            index: &self.index,
        };
        Record::from_row(&row)
    }

    fn split_tokens(&self, line: &str, line_no: LineNo) -> SurveyResult<Vec<Option<f64>>> {
        let fields = &self.codebook.fields;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < fields.len() {
            return Err(SurveyError::parse(
                line_no,
                &fields[tokens.len()].name,
                format!("line has {} tokens, layout expects {}", tokens.len(), fields.len()),
            ));
        }
        if tokens.len() > fields.len() {
            return Err(SurveyError::parse(
                line_no,
                &fields[fields.len() - 1].name,
                format!("line has {} tokens, layout expects {}", tokens.len(), fields.len()),
            ));
        }
        fields
            .iter()
            .zip(tokens)
            .map(|(field, token)| self.decode(field, token, line_no))
            .collect()
    }

    fn slice_columns(&self, line: &str, line_no: LineNo) -> SurveyResult<Vec<Option<f64>>> {
        self.codebook
            .fields
            .iter()
            .map(|field| {
                let end = field.end.min(line.len());
                let text = if field.start >= end {
                    ""
                } else {
                    line.get(field.start..end).ok_or_else(|| {
                        SurveyError::parse(
                            line_no,
                            &field.name,
                            "column range splits a multi-byte character",
                        )
                    })?
                };
                self.decode(field, text, line_no)
            })
            .collect()
    }

    fn decode(&self, field: &FieldSpec, text: &str, line_no: LineNo) -> SurveyResult<Option<f64>> {
        let text = text.trim();
        if text.is_empty() || text == self.codebook.sentinel(field) {
            return Ok(None);
        }
        let value = match field.kind {
            FieldKind::Integer => text.parse::<i64>().map(|v| v as f64).map_err(|_| {
                SurveyError::parse(line_no, &field.name, format!("'{text}' is not an integer"))
            })?,
            FieldKind::Decimal => text.parse::<f64>().map_err(|_| {
                SurveyError::parse(line_no, &field.name, format!("'{text}' is not a number"))
            })?,
        };
        if !value.is_finite() {
            return Err(SurveyError::parse(
                line_no,
                &field.name,
                format!("'{text}' is not a finite number"),
            ));
        }
        Ok(Some(value))
    }
}

/// Parse a single line against a layout.
pub fn parse_line(
    line: &str,
    line_no: LineNo,
    codebook: &Codebook,
    mode: InputMode,
) -> SurveyResult<Record> {
    RecordReader::new(codebook, mode)?.parse_line(line, line_no)
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<Record>,
    /// Lines skipped under `BadRecordPolicy::Skip`.
    pub rejected: Vec<SurveyError>,
    pub lines_read: usize,
}

pub fn read_dataset<R: BufRead>(
    input: R,
    codebook: &Codebook,
    mode: InputMode,
    policy: BadRecordPolicy,
) -> SurveyResult<LoadReport> {
    let reader = RecordReader::new(codebook, mode)?;
    let mut report = LoadReport::default();

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        report.lines_read = line_no;
        if line.trim().is_empty() {
            continue;
        }
        match reader.parse_line(&line, line_no) {
            Ok(record) => report.records.push(record),
            Err(e) => match policy {
                BadRecordPolicy::Abort => return Err(e),
                BadRecordPolicy::Skip => {
                    log::warn!("reader: skipping record: {e}");
                    report.rejected.push(e);
                }
            },
        }
    }

    log::info!(
        "reader: {} records parsed, {} rejected ({:?} mode)",
        report.records.len(),
        report.rejected.len(),
        mode
    );
    Ok(report)
}

/// Open `path` and read it. The file handle is dropped on every return path.
pub fn read_dataset_file(
    path: impl AsRef<Path>,
    codebook: &Codebook,
    mode: InputMode,
    policy: BadRecordPolicy,
) -> SurveyResult<LoadReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        SurveyError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open {}: {e}", path.display()),
        ))
    })?;
    read_dataset(BufReader::new(file), codebook, mode, policy)
}
