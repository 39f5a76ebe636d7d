//! Shared primitive types used across the survey pipeline.

use serde::{Deserialize, Serialize};

/// The interview sheet number. Unique per store.
pub type StoreId = u32;

/// 1-based line number in the raw survey file.
pub type LineNo = usize;

/// One of the two observation rounds on the same stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wave {
    First,
    Second,
}
