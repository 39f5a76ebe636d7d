//! Field layout ("codebook") for the flat survey file.
//!
//! The layout is owned by whoever ships the data file, not by this crate.
//! It arrives as configuration (JSON) or from `Codebook::standard()`, and is
//! validated exactly once before any line is parsed.
//!
//! Columns are 0-based byte offsets, end-exclusive. In whitespace mode only
//! the field order matters; offsets are neither read nor validated, and a
//! JSON layout may omit them.

use crate::{
    error::{SurveyError, SurveyResult},
    reader::InputMode,
    record::REQUIRED_FIELDS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MISSING: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub kind: FieldKind,
    /// Overrides the codebook-wide sentinel for this field.
    #[serde(default)]
    pub missing: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, start: usize, end: usize, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
            kind,
            missing: None,
        }
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    #[serde(default = "default_missing")]
    pub missing: String,
    pub fields: Vec<FieldSpec>,
}

fn default_missing() -> String {
    DEFAULT_MISSING.to_string()
}

impl Codebook {
    /// Read a JSON layout from disk and validate it for `mode`.
    pub fn load(path: &str, mode: InputMode) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let codebook: Codebook = serde_json::from_str(&content)?;
        codebook.validate(mode)?;
        log::info!("codebook: loaded {} fields from {path}", codebook.fields.len());
        Ok(codebook)
    }

    /// The published layout of the public two-wave survey file.
    pub fn standard() -> Self {
        use FieldKind::{Decimal, Integer};
        let layout: [(&str, usize, usize, FieldKind); 46] = [
            ("SHEET", 0, 3, Integer),
            ("CHAINr", 4, 5, Integer),
            ("CO_OWNED", 6, 7, Integer),
            ("STATEr", 8, 9, Integer),
            ("SOUTHJ", 10, 11, Integer),
            ("CENTRALJ", 12, 13, Integer),
            ("NORTHJ", 14, 15, Integer),
            ("PA1", 16, 17, Integer),
            ("PA2", 18, 19, Integer),
            ("SHORE", 20, 21, Integer),
            ("NCALLS", 22, 24, Integer),
            ("EMPFT", 25, 30, Decimal),
            ("EMPPT", 31, 36, Decimal),
            ("NMGRS", 37, 42, Decimal),
            ("WAGE_ST", 43, 48, Decimal),
            ("INCTIME", 49, 54, Decimal),
            ("FIRSTINC", 55, 60, Decimal),
            ("BONUS", 61, 62, Integer),
            ("PCTAFF", 63, 68, Decimal),
            ("MEAL", 69, 70, Integer),
            ("OPEN", 71, 76, Decimal),
            ("HRSOPEN", 77, 82, Decimal),
            ("PSODA", 83, 88, Decimal),
            ("PFRY", 89, 94, Decimal),
            ("PENTREE", 95, 100, Decimal),
            ("NREGS", 101, 103, Integer),
            ("NREGS11", 104, 106, Integer),
            ("TYPE2", 107, 108, Integer),
            ("STATUS2", 109, 110, Integer),
            ("DATE2", 111, 117, Integer),
            ("NCALLS2", 118, 120, Integer),
            ("EMPFT2", 121, 126, Decimal),
            ("EMPPT2", 127, 132, Decimal),
            ("NMGRS2", 133, 138, Decimal),
            ("WAGE_ST2", 139, 144, Decimal),
            ("INCTIME2", 145, 150, Decimal),
            ("FIRSTIN2", 151, 156, Decimal),
            ("SPECIAL2", 157, 158, Integer),
            ("MEALS2", 159, 160, Integer),
            ("OPEN2R", 161, 166, Decimal),
            ("HRSOPEN2", 167, 172, Decimal),
            ("PSODA2", 173, 178, Decimal),
            ("PFRY2", 179, 184, Decimal),
            ("PENTREE2", 185, 190, Decimal),
            ("NREGS2", 191, 193, Integer),
            ("NREGS112", 194, 196, Integer),
        ];

        Self {
            missing: default_missing(),
            fields: layout
                .iter()
                .map(|&(name, start, end, kind)| FieldSpec::new(name, start, end, kind))
                .collect(),
        }
    }

    /// Schema check. Runs before parsing so that a bad layout aborts the run
    /// with the offending field named, instead of failing every line.
    /// Column offsets are checked only for `InputMode::FixedWidth`.
    pub fn validate(&self, mode: InputMode) -> SurveyResult<()> {
        if self.fields.is_empty() {
            return Err(SurveyError::Configuration("codebook has no fields".into()));
        }
        if self.missing.trim().is_empty() {
            return Err(SurveyError::Configuration(
                "missing-value sentinel must not be blank".into(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SurveyError::Configuration(format!(
                    "field #{i} has an empty name"
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SurveyError::Configuration(format!(
                    "field '{}' is defined more than once",
                    field.name
                )));
            }
        }
        if mode == InputMode::FixedWidth {
            self.validate_columns()?;
        }

        for required in REQUIRED_FIELDS {
            if !seen.contains(required) {
                return Err(SurveyError::Configuration(format!(
                    "codebook is missing required field '{required}'"
                )));
            }
        }
        Ok(())
    }

    /// Non-empty, ascending, non-overlapping column ranges.
    fn validate_columns(&self) -> SurveyResult<()> {
        let mut previous_end = 0usize;
        for (i, field) in self.fields.iter().enumerate() {
            if field.start >= field.end {
                return Err(SurveyError::Configuration(format!(
                    "field '{}' has empty column range {}..{}",
                    field.name, field.start, field.end
                )));
            }
            if i > 0 && field.start < previous_end {
                return Err(SurveyError::Configuration(format!(
                    "field '{}' starts at column {} inside the previous field (ends at {})",
                    field.name, field.start, previous_end
                )));
            }
            previous_end = field.end;
        }
        Ok(())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn sentinel<'a>(&'a self, field: &'a FieldSpec) -> &'a str {
        field.missing.as_deref().unwrap_or(&self.missing)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
