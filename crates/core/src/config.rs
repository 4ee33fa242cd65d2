//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handlers never read environment variables; they receive an
//! `Arc<CoreConfig>` through application state.

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the data source reads and writes bundles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataMode {
    /// The flat JSON file at [`CoreConfig::data_file`].
    File,
    /// The built-in sample bundle, held in memory. Appends are lost on restart.
    Sample,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
    cache_ttl: Duration,
    other_threshold: usize,
    correct_categories: bool,
    data_mode: DataMode,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the threshold is zero, the TTL is zero, or the data
    /// file path is empty.
    pub fn new(
        data_file: PathBuf,
        cache_ttl: Duration,
        other_threshold: usize,
        correct_categories: bool,
        data_mode: DataMode,
    ) -> CoreResult<Self> {
        if data_file.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput("data_file cannot be empty".into()));
        }
        if other_threshold == 0 {
            return Err(CoreError::InvalidInput(
                "other_threshold must be at least 1".into(),
            ));
        }
        if cache_ttl.is_zero() {
            return Err(CoreError::InvalidInput(
                "cache_ttl must be greater than zero".into(),
            ));
        }

        Ok(Self {
            data_file,
            cache_ttl,
            other_threshold,
            correct_categories,
            data_mode,
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn other_threshold(&self) -> usize {
        self.other_threshold
    }

    pub fn correct_categories(&self) -> bool {
        self.correct_categories
    }

    pub fn data_mode(&self) -> DataMode {
        self.data_mode
    }
}

/// Parse an optional unsigned integer setting.
///
/// `None` or an empty/whitespace value yields `default`.
pub fn parse_u64_env_value(name: &str, value: Option<String>, default: u64) -> CoreResult<u64> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| CoreError::InvalidInput(format!("{name} must be an integer: {e}"))),
    }
}

/// Parse an optional boolean setting (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
///
/// `None` or an empty/whitespace value yields `default`.
pub fn parse_bool_env_value(name: &str, value: Option<String>, default: bool) -> CoreResult<bool> {
    let Some(v) = value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(default);
    };

    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(CoreError::InvalidInput(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_DATA_FILE, DEFAULT_OTHER_THRESHOLD};

    #[test]
    fn accepts_defaults() {
        let cfg = CoreConfig::new(
            PathBuf::from(DEFAULT_DATA_FILE),
            DEFAULT_CACHE_TTL,
            DEFAULT_OTHER_THRESHOLD,
            true,
            DataMode::File,
        )
        .expect("valid config");

        assert_eq!(cfg.other_threshold(), 5);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60_000));
        assert_eq!(cfg.data_file(), Path::new(DEFAULT_DATA_FILE));
        assert!(cfg.correct_categories());
        assert_eq!(cfg.data_mode(), DataMode::File);
    }

    #[test]
    fn rejects_zero_threshold_and_ttl() {
        let zero_threshold = CoreConfig::new(
            PathBuf::from("x.json"),
            DEFAULT_CACHE_TTL,
            0,
            true,
            DataMode::File,
        );
        assert!(matches!(zero_threshold, Err(CoreError::InvalidInput(_))));

        let zero_ttl = CoreConfig::new(
            PathBuf::from("x.json"),
            Duration::ZERO,
            5,
            true,
            DataMode::File,
        );
        assert!(matches!(zero_ttl, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn parses_integer_values() {
        assert_eq!(parse_u64_env_value("N", None, 7).unwrap(), 7);
        assert_eq!(parse_u64_env_value("N", Some("  ".into()), 7).unwrap(), 7);
        assert_eq!(parse_u64_env_value("N", Some(" 50 ".into()), 7).unwrap(), 50);

        let err = parse_u64_env_value("ALLERGY_OTHER_THRESHOLD", Some("many".into()), 7)
            .expect_err("non-numeric");
        assert!(err.to_string().contains("ALLERGY_OTHER_THRESHOLD"));
    }

    #[test]
    fn parses_boolean_values() {
        assert!(parse_bool_env_value("B", None, true).unwrap());
        assert!(!parse_bool_env_value("B", Some("FALSE".into()), true).unwrap());
        assert!(parse_bool_env_value("B", Some("1".into()), false).unwrap());
        assert!(!parse_bool_env_value("B", Some("off".into()), true).unwrap());
        assert!(parse_bool_env_value("B", Some("maybe".into()), true).is_err());
    }
}
