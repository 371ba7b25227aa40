//! # Configuration
//!
//! Application settings, loaded in layers:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`scanner.toml` unless `--config` names another)
//! 3. Environment variables prefixed `SCANNER__`, with `__` between keys
//!    (e.g. `SCANNER__SERVER__PORT=9000`, `SCANNER__SCORING__TOP_N=10`)
//!
//! [`ScannerConfig::validate`] runs once at startup; a config that fails
//! it stops the process before any request is served.

use crate::application::services::analysis::{AnalysisConfig, DEFAULT_TOP_N};
use crate::domain::services::scoring::{
    DEFAULT_SWEET_SPOT_HIGH, DEFAULT_SWEET_SPOT_LOW, PriceBands, ScoreWeights, ScoringConfig,
    ScoringConfigError, VolumeSaturation,
};
use crate::infrastructure::eligibility::nse::{
    DEFAULT_CACHE_FILE, DEFAULT_CACHE_TTL_HOURS, DEFAULT_FO_LIST_URL, DEFAULT_TIMEOUT_MS,
    NseFoConfig,
};
use crate::infrastructure::scanners::chartink::{
    ChartinkConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_WARMUP_TIMEOUT_MS,
};
use crate::infrastructure::scanners::traits::NamedQuery;
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File read when no `--config` path is given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "scanner.toml";

/// Prefix of overriding environment variables.
pub const ENV_PREFIX: &str = "SCANNER";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A field holds an unusable value.
    #[error("invalid configuration `{field}`: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong.
        reason: String,
    },

    /// Scoring parameters are inconsistent.
    #[error("invalid scoring configuration: {0}")]
    Scoring(#[from] ScoringConfigError),
}

impl ConfigError {
    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Screener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Screener origin.
    pub base_url: String,
    /// Timeout per clause POST in milliseconds.
    pub request_timeout_ms: u64,
    /// Timeout of the warm-up GET in milliseconds.
    pub warmup_timeout_ms: u64,
    /// Scans to run, in reporting order.
    pub queries: Vec<NamedQuery>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            warmup_timeout_ms: DEFAULT_WARMUP_TIMEOUT_MS,
            queries: default_queries(),
        }
    }
}

/// The stock scan set: volume breakout, RSI momentum and EMA crossover.
#[must_use]
pub fn default_queries() -> Vec<NamedQuery> {
    vec![
        NamedQuery::new(
            "volume_breakout",
            "( {cash} ( volume > 2 * ( avg volume(20) ) \
             and close > open \
             and close > ( max(10, close) ) ) \
             and [nse] )",
        ),
        NamedQuery::new(
            "rsi_momentum",
            "( {cash} ( [RSI(14)] >= 60 \
             and [RSI(14)] <= 75 \
             and close > open \
             and volume > 1.5 * ( avg volume(20) ) ) \
             and [nse] )",
        ),
        NamedQuery::new(
            "ema_crossover",
            "( {cash} ( latest ema(9,close) > latest ema(21,close) \
             and 1 day ago ema(9,close) <= 1 day ago ema(21,close) \
             and volume > avg volume(10) ) \
             and [nse] )",
        ),
    ]
}

/// Eligibility list settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// CSV location.
    pub url: String,
    /// Cache file path.
    pub cache_file: PathBuf,
    /// Cache lifetime in hours.
    pub cache_ttl_hours: u64,
    /// Download timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FO_LIST_URL.to_string(),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Factor weights as configured.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// Weight of the scanner-hit factor.
    pub scanner_count: f64,
    /// Weight of the volume-ratio factor.
    pub volume_ratio: f64,
    /// Weight of the price-range factor.
    pub price_range: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        let weights = ScoreWeights::default();
        Self {
            scanner_count: weights.scanner_count(),
            volume_ratio: weights.volume_ratio(),
            price_range: weights.price_range(),
        }
    }
}

/// Scoring and selection settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringSection {
    /// Number of picks returned.
    pub top_n: usize,
    /// Lowest tradeable price.
    pub min_price: f64,
    /// Highest tradeable price.
    pub max_price: f64,
    /// Lower edge of the full-score price range.
    pub sweet_spot_low: f64,
    /// Upper edge of the full-score price range.
    pub sweet_spot_high: f64,
    /// Hit-count ceiling. Defaults to the number of queries; if set it
    /// must equal that number.
    pub max_possible_hits: Option<usize>,
    /// Volume ratio that scores zero.
    pub volume_baseline: f64,
    /// Ratio distance above the baseline that scores one.
    pub volume_span: f64,
    /// Factor weights.
    pub weights: WeightsConfig,
}

impl Default for ScoringSection {
    fn default() -> Self {
        let bands = PriceBands::default();
        let volume = VolumeSaturation::default();
        Self {
            top_n: DEFAULT_TOP_N,
            min_price: bands.min(),
            max_price: bands.max(),
            sweet_spot_low: DEFAULT_SWEET_SPOT_LOW,
            sweet_spot_high: DEFAULT_SWEET_SPOT_HIGH,
            max_possible_hits: None,
            volume_baseline: volume.baseline(),
            volume_span: volume.span(),
            weights: WeightsConfig::default(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// HTTP server.
    pub server: ServerConfig,
    /// Screener.
    pub scan: ScanConfig,
    /// Eligibility list.
    pub eligibility: EligibilityConfig,
    /// Scoring and selection.
    pub scoring: ScoringSection,
    /// Logging.
    pub logging: LogConfig,
}

impl ScannerConfig {
    /// Loads and validates the configuration.
    ///
    /// With `path` set, the file must exist. Without it,
    /// [`DEFAULT_CONFIG_FILE`] is read if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source cannot be read or does not
    /// match the schema, or a validation error from [`Self::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from TOML text, then validates it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every cross-field rule.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let queries = &self.scan.queries;
        if queries.is_empty() {
            return Err(ConfigError::invalid(
                "scan.queries",
                "at least one query is required",
            ));
        }
        let mut names = HashSet::new();
        for query in queries {
            if query.name.trim().is_empty() {
                return Err(ConfigError::invalid("scan.queries", "query name is blank"));
            }
            if query.clause.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "scan.queries",
                    format!("query `{}` has a blank clause", query.name),
                ));
            }
            if !names.insert(query.name.as_str()) {
                return Err(ConfigError::invalid(
                    "scan.queries",
                    format!("query name `{}` is used twice", query.name),
                ));
            }
        }

        if self.scan.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("scan.base_url", "must not be empty"));
        }
        if self.scan.request_timeout_ms == 0 || self.scan.warmup_timeout_ms == 0 {
            return Err(ConfigError::invalid("scan", "timeouts must be positive"));
        }
        if self.eligibility.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "eligibility.timeout_ms",
                "must be positive",
            ));
        }
        if self.scoring.top_n == 0 {
            return Err(ConfigError::invalid("scoring.top_n", "must be at least 1"));
        }
        if let Some(ceiling) = self.scoring.max_possible_hits
            && ceiling != queries.len()
        {
            return Err(ConfigError::invalid(
                "scoring.max_possible_hits",
                format!("is {ceiling} but {} queries are configured", queries.len()),
            ));
        }

        self.scoring_config().map(|_| ())
    }

    /// Builds the validated scoring parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Scoring` if weights, bands or volume constants
    /// are invalid.
    pub fn scoring_config(&self) -> Result<ScoringConfig, ConfigError> {
        let s = &self.scoring;
        let weights = ScoreWeights::new(
            s.weights.scanner_count,
            s.weights.volume_ratio,
            s.weights.price_range,
        )?;
        let bands = PriceBands::new(s.min_price, s.sweet_spot_low, s.sweet_spot_high, s.max_price)?;
        let volume = VolumeSaturation::new(s.volume_baseline, s.volume_span)?;
        let ceiling = s.max_possible_hits.unwrap_or(self.scan.queries.len());
        Ok(ScoringConfig::new(weights, bands, volume, ceiling)?)
    }

    /// Pipeline settings.
    #[must_use]
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::new(self.scan.queries.clone(), self.scoring.top_n)
    }

    /// Screener connection settings.
    #[must_use]
    pub fn chartink_config(&self) -> ChartinkConfig {
        ChartinkConfig {
            base_url: self.scan.base_url.clone(),
            request_timeout_ms: self.scan.request_timeout_ms,
            warmup_timeout_ms: self.scan.warmup_timeout_ms,
        }
    }

    /// Eligibility list settings.
    #[must_use]
    pub fn nse_config(&self) -> NseFoConfig {
        NseFoConfig {
            url: self.eligibility.url.clone(),
            cache_file: self.eligibility.cache_file.clone(),
            cache_ttl_hours: self.eligibility.cache_ttl_hours,
            timeout_ms: self.eligibility.timeout_ms,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn defaults_are_valid() {
        let config = ScannerConfig::default();
        config.validate().unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.scan.queries.len(), 3);
        assert_eq!(config.scan.queries[0].name, "volume_breakout");
        assert_eq!(config.scoring.top_n, 5);
        assert_eq!(config.scoring.min_price, 100.0);
        assert_eq!(config.scoring.max_price, 5000.0);

        let scoring = config.scoring_config().unwrap();
        assert_eq!(scoring.max_possible_hits(), 3);
        assert!((scoring.weights().scanner_count() - 0.40).abs() < 1e-12);
    }

    #[test]
    fn clauses_keep_screener_syntax() {
        let queries = default_queries();
        assert_eq!(
            queries[0].clause,
            "( {cash} ( volume > 2 * ( avg volume(20) ) and close > open \
             and close > ( max(10, close) ) ) and [nse] )"
        );
        assert!(queries[2].clause.contains("1 day ago ema(9,close) <= 1 day ago ema(21,close)"));
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ScannerConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [scoring]
            top_n = 3

            [scoring.weights]
            scanner_count = 0.5
            volume_ratio = 0.3
            price_range = 0.2

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scoring.top_n, 3);
        assert_eq!(config.scoring.weights.scanner_count, 0.5);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.scan.queries.len(), 3);
    }

    #[test]
    fn queries_from_toml_drive_hit_ceiling() {
        let config = ScannerConfig::from_toml_str(
            r#"
            [[scan.queries]]
            name = "a"
            clause = "( {cash} ( close > 1 ) )"

            [[scan.queries]]
            name = "b"
            clause = "( {cash} ( close > 2 ) )"
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.queries.len(), 2);
        assert_eq!(config.scoring_config().unwrap().max_possible_hits(), 2);
        assert_eq!(config.analysis_config().queries.len(), 2);
    }

    #[test]
    fn weights_must_sum_to_one() {
        let mut config = ScannerConfig::default();
        config.scoring.weights.price_range = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Scoring(ScoringConfigError::WeightsDoNotSumToOne { .. }))
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let mut config = ScannerConfig::default();
        config.scoring.weights = WeightsConfig {
            scanner_count: 1.2,
            volume_ratio: -0.2,
            price_range: 0.0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Scoring(ScoringConfigError::InvalidWeight { .. }))
        ));
    }

    #[test]
    fn ceiling_must_match_query_count() {
        let mut config = ScannerConfig::default();
        config.scoring.max_possible_hits = Some(4);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scoring.max_possible_hits"));

        config.scoring.max_possible_hits = Some(3);
        config.validate().unwrap();
    }

    #[test]
    fn empty_queries_rejected() {
        let mut config = ScannerConfig::default();
        config.scan.queries.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "scan.queries",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_query_names_rejected() {
        let mut config = ScannerConfig::default();
        config.scan.queries[1].name = "volume_breakout".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_price_bands_rejected() {
        let mut config = ScannerConfig::default();
        config.scoring.min_price = 6000.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Scoring(ScoringConfigError::InvalidPriceBands { .. }))
        ));
    }

    #[test]
    fn zero_top_n_rejected() {
        let mut config = ScannerConfig::default();
        config.scoring.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn collaborator_configs() {
        let config = ScannerConfig::default();
        assert_eq!(config.chartink_config(), ChartinkConfig::default());
        assert_eq!(config.nse_config(), NseFoConfig::default());
    }

    #[test]
    fn missing_explicit_file_fails() {
        let err = ScannerConfig::load(Some(Path::new("/nonexistent/scanner.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
