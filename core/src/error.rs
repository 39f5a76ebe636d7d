use thiserror::Error;

use crate::types::LineNo;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("line {line}: field '{field}': {reason}")]
    Parse {
        line: LineNo,
        field: String,
        reason: String,
    },

    #[error("insufficient data for {context}: need at least {needed} observations, have {available}")]
    InsufficientData {
        context: String,
        needed: usize,
        available: usize,
    },

    #[error("every regressor is degenerate in this sample: {dropped:?}")]
    RankDeficiency { dropped: Vec<String> },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SurveyError {
    pub fn parse(line: LineNo, field: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn insufficient(context: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            needed,
            available,
        }
    }

    /// Local conditions that degrade to a blank table cell instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::RankDeficiency { .. }
        )
    }
}

pub type SurveyResult<T> = Result<T, SurveyError>;
