use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::table::OutputFormat;
use crate::temporal::DEFAULT_YEAR;

pub const FIRST_ORDER_ID: u64 = 123456;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub year: i32,
    pub first_order_id: u64,
    pub seed: Option<u64>,
    pub parallel_months: bool,
    pub output_format: OutputFormat,
    pub summary_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: PathBuf::from("./data"),
            year: DEFAULT_YEAR,
            first_order_id: FIRST_ORDER_ID,
            seed: None,
            parallel_months: false,
            output_format: OutputFormat::Csv,
            summary_path: PathBuf::from("generation_summary.json"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset keys fall back to defaults; set but unparseable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Ok(Config {
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            year: parse_var(&lookup, "SALES_YEAR")?.unwrap_or(defaults.year),
            first_order_id: parse_var(&lookup, "FIRST_ORDER_ID")?.unwrap_or(defaults.first_order_id),
            seed: parse_var(&lookup, "RNG_SEED")?,
            parallel_months: parse_var(&lookup, "PARALLEL_MONTHS")?.unwrap_or(defaults.parallel_months),
            output_format: parse_var(&lookup, "OUTPUT_FORMAT")?.unwrap_or(defaults.output_format),
            summary_path: lookup("SUMMARY_PATH").map(PathBuf::from).unwrap_or(defaults.summary_path),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid {}={:?}", key, raw)),
    }
}
