// src/config.rs
use std::str::FromStr;

use crate::tables::{AcceptAll, FinancialKeywords, TableFilter};
use crate::utils::error::ConfigError;

pub const TABLE_FILTER_ENV: &str = "FILING_TABLE_FILTER";
pub const DEDUPE_ORPHANS_ENV: &str = "FILING_DEDUPE_ORPHANS";

/// Built-in table inclusion predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FilterMode {
    /// Keep every table (maximum recall).
    #[default]
    All,
    /// Keep tables mentioning financial statement vocabulary.
    Financial,
}

impl FromStr for FilterMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "financial" => Ok(Self::Financial),
            _ => Err(ConfigError::InvalidValue {
                var: TABLE_FILTER_ENV,
                value: s.to_string(),
                expected: "'all' or 'financial'",
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    pub table_filter: FilterMode,
    /// Skip orphan tables the note scan already attached to the same section.
    pub dedupe_orphan_tables: bool,
}

impl ParserConfig {
    /// Reads `FILING_TABLE_FILTER` and `FILING_DEDUPE_ORPHANS`; unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(TABLE_FILTER_ENV) {
            config.table_filter = value.parse()?;
        }
        if let Some(value) = lookup(DEDUPE_ORPHANS_ENV) {
            config.dedupe_orphan_tables = parse_flag(DEDUPE_ORPHANS_ENV, &value)?;
        }
        Ok(config)
    }

    pub fn build_filter(&self) -> Box<dyn TableFilter> {
        match self.table_filter {
            FilterMode::All => Box::new(AcceptAll),
            FilterMode::Financial => Box::new(FinancialKeywords::default()),
        }
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            expected: "a boolean flag",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ParserConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.build_filter().name(), "all");
    }

    #[test]
    fn test_reads_values() {
        let config = ParserConfig::from_lookup(lookup(&[
            (TABLE_FILTER_ENV, "Financial"),
            (DEDUPE_ORPHANS_ENV, "yes"),
        ]))
        .unwrap();
        assert_eq!(config.table_filter, FilterMode::Financial);
        assert!(config.dedupe_orphan_tables);
        assert_eq!(config.build_filter().name(), "financial");
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ParserConfig::from_lookup(lookup(&[(TABLE_FILTER_ENV, "strict")])).unwrap_err();
        assert!(err.to_string().contains("FILING_TABLE_FILTER"));

        let err = ParserConfig::from_lookup(lookup(&[(DEDUPE_ORPHANS_ENV, "maybe")])).unwrap_err();
        assert!(err.to_string().contains("boolean"));
    }
}
