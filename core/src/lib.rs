//! Minimum-wage survey core: read the two-wave fast-food store survey,
//! derive employment and wage variables, and estimate the published tables.
//!
//! Data flows one way:
//! raw file -> `Record` -> `Dataset` (derived variables) -> `Sample`
//! -> `stats` / `regression` -> `report::Table`.

pub mod codebook;
pub mod config;
pub mod dataset;
pub mod derived;
pub mod error;
pub mod reader;
pub mod record;
pub mod regression;
pub mod report;
pub mod sample;
pub mod stats;
pub mod synthetic;
pub mod tables;
pub mod types;
pub mod variable;
