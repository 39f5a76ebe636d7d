use crate::{
    codebook::Codebook,
    derived::DerivationConfig,
    error::{SurveyError, SurveyResult},
    reader::{BadRecordPolicy, InputMode},
    tables::TableId,
};
use serde::{Deserialize, Serialize};

/// Everything a run needs besides the data file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub derivation: DerivationConfig,
    pub input_mode: InputMode,
    pub bad_records: BadRecordPolicy,
    /// Path to a JSON field layout. `None` means the published layout.
    pub codebook: Option<String>,
    pub tables: Vec<TableId>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            derivation: DerivationConfig::default(),
            input_mode: InputMode::Whitespace,
            bad_records: BadRecordPolicy::Skip,
            codebook: None,
            tables: TableId::ALL.to_vec(),
        }
    }
}

impl RunConfig {
    /// Load a run configuration from a JSON file. Missing keys take defaults.
    /// In tests, use RunConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: RunConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!(
            "config: loaded {path} (mode={:?}, bad_records={:?}, tables={:?})",
            config.input_mode,
            config.bad_records,
            config.tables
        );
        Ok(config)
    }

    /// Defaults with bad records aborting the load, so tests see every
    /// parse failure.
    pub fn default_test() -> Self {
        Self {
            bad_records: BadRecordPolicy::Abort,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SurveyResult<()> {
        self.derivation.validate()?;
        if self.tables.is_empty() {
            return Err(SurveyError::Configuration("no tables requested".into()));
        }
        if let Some(path) = &self.codebook {
            if path.trim().is_empty() {
                return Err(SurveyError::Configuration("codebook path is blank".into()));
            }
        }
        Ok(())
    }

    /// The configured layout, or the published one.
    pub fn load_codebook(&self) -> anyhow::Result<Codebook> {
        match &self.codebook {
            Some(path) => Codebook::load(path, self.input_mode),
            None => Ok(Codebook::standard()),
        }
    }
}
