//! Engine configuration.
//!
//! Rates are written as annual percentages (`110` means 110% APR) and
//! converted to FP32 hourly values by [`EngineConfig::rate_parameters`].

use std::path::Path;

use lendcurve_core::fixed_point::{hourly_interest_fp_from_apr, hourly_yield_fp_from_apr};
use lendcurve_core::types::{DAY, HOUR};
use lendcurve_rates::{RateParameters, RuntimeBounds, SpeedParams};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

// ============================================================================
// Flow Speed
// ============================================================================

/// Flow-speed weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Seconds added to a runtime before computing the history weight.
    #[serde(default = "default_weight_offset")]
    pub weight_offset_secs: u64,
    /// Divisor of the history weight.
    #[serde(default = "default_weight_divisor")]
    pub weight_divisor: u64,
}

fn default_weight_offset() -> u64 {
    2 * HOUR
}

fn default_weight_divisor() -> u64 {
    3
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            weight_offset_secs: default_weight_offset(),
            weight_divisor: default_weight_divisor(),
        }
    }
}

impl From<SpeedConfig> for SpeedParams {
    fn from(config: SpeedConfig) -> Self {
        SpeedParams {
            weight_offset: config.weight_offset_secs,
            weight_divisor: config.weight_divisor,
        }
    }
}

// ============================================================================
// Engine Config
// ============================================================================

/// Top-level lending engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deployment name, used in logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Shortest fixed-term runtime in seconds.
    #[serde(default = "default_min_runtime")]
    pub min_runtime_secs: u64,

    /// Longest fixed-term runtime in seconds.
    #[serde(default = "default_max_runtime")]
    pub max_runtime_secs: u64,

    /// APR used to seed new bucket yields.
    #[serde(default = "default_seed_bond_apr")]
    pub seed_bond_apr: Decimal,

    /// Highest hourly rate any market may quote, as APR.
    #[serde(default = "default_max_hourly_yield_apr")]
    pub max_hourly_yield_apr: Decimal,

    /// How far quoted yields drift per hour, as APR points.
    #[serde(default = "default_yield_change_apr")]
    pub yield_change_apr_per_hour: Decimal,

    /// Borrower markup over the hourly bond rate, as APR.
    #[serde(default = "default_borrowing_markup_apr")]
    pub borrowing_markup_apr: Decimal,

    /// Lowest rate charged to borrowers, as APR.
    #[serde(default = "default_borrow_min_apr")]
    pub borrow_min_apr: Decimal,

    /// Spare lending targeted on top of current borrowing, in token base units.
    ///
    /// Written as a string so 18-decimal amounts survive TOML; plain integers
    /// are accepted too.
    #[serde(default = "default_lending_buffer", with = "token_amount")]
    pub lending_buffer: u128,

    /// Seconds after each hourly anniversary in which hourly bonds can be withdrawn.
    #[serde(default = "default_withdrawal_window")]
    pub withdrawal_window_secs: u64,

    /// Flow-speed weighting.
    #[serde(default)]
    pub speed: SpeedConfig,
}

fn default_name() -> String {
    "lendcurve".to_string()
}

fn default_min_runtime() -> u64 {
    30 * DAY
}

fn default_max_runtime() -> u64 {
    365 * DAY
}

fn default_seed_bond_apr() -> Decimal {
    Decimal::from(110)
}

fn default_max_hourly_yield_apr() -> Decimal {
    Decimal::from(200)
}

fn default_yield_change_apr() -> Decimal {
    Decimal::ONE
}

fn default_borrowing_markup_apr() -> Decimal {
    Decimal::from(3)
}

fn default_borrow_min_apr() -> Decimal {
    Decimal::from(6)
}

fn default_lending_buffer() -> u128 {
    10_000
}

fn default_withdrawal_window() -> u64 {
    20 * 60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            min_runtime_secs: default_min_runtime(),
            max_runtime_secs: default_max_runtime(),
            seed_bond_apr: default_seed_bond_apr(),
            max_hourly_yield_apr: default_max_hourly_yield_apr(),
            yield_change_apr_per_hour: default_yield_change_apr(),
            borrowing_markup_apr: default_borrowing_markup_apr(),
            borrow_min_apr: default_borrow_min_apr(),
            lending_buffer: default_lending_buffer(),
            withdrawal_window_secs: default_withdrawal_window(),
            speed: SpeedConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a default configuration with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Parses and validates JSON text.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Loads a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builder method to set runtime bounds.
    pub fn with_runtime_bounds(mut self, min_runtime_secs: u64, max_runtime_secs: u64) -> Self {
        self.min_runtime_secs = min_runtime_secs;
        self.max_runtime_secs = max_runtime_secs;
        self
    }

    /// Builder method to set the seed APR.
    pub fn with_seed_bond_apr(mut self, apr: Decimal) -> Self {
        self.seed_bond_apr = apr;
        self
    }

    /// Builder method to set the yield drift.
    pub fn with_yield_change_apr_per_hour(mut self, apr: Decimal) -> Self {
        self.yield_change_apr_per_hour = apr;
        self
    }

    /// Builder method to set the lending buffer.
    pub fn with_lending_buffer(mut self, buffer: u128) -> Self {
        self.lending_buffer = buffer;
        self
    }

    /// Builder method to set the hourly withdrawal window.
    pub fn with_withdrawal_window(mut self, seconds: u64) -> Self {
        self.withdrawal_window_secs = seconds;
        self
    }

    /// Runtime bounds in engine form.
    pub fn runtime_bounds(&self) -> ConfigResult<RuntimeBounds> {
        RuntimeBounds::new(self.min_runtime_secs, self.max_runtime_secs).map_err(|e| {
            ConfigError::Validation {
                field: "min_runtime_secs".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Rate parameters in FP32 engine units.
    pub fn rate_parameters(&self) -> ConfigResult<RateParameters> {
        Ok(RateParameters {
            max_hourly_yield_fp: hourly_yield_fp_from_apr(self.max_hourly_yield_apr)?,
            yield_change_per_hour_fp: hourly_interest_fp_from_apr(self.yield_change_apr_per_hour)?,
            seed_hourly_interest_fp: hourly_interest_fp_from_apr(self.seed_bond_apr)?,
            borrowing_markup_fp: hourly_interest_fp_from_apr(self.borrowing_markup_apr)?,
            borrow_min_hourly_yield_fp: hourly_yield_fp_from_apr(self.borrow_min_apr)?,
            withdrawal_window: self.withdrawal_window_secs,
            speed: self.speed.into(),
        })
    }
}

/// Serde adapter for `u128` token amounts. TOML integers stop at `i64`.
mod token_amount {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Integer(amount) => Ok(u128::from(amount)),
            Raw::Text(text) => text.trim().replace('_', "").parse().map_err(|_| {
                de::Error::custom(format!("expected a non-negative integer amount, got {text:?}"))
            }),
        }
    }
}

fn non_negative(errors: &mut Vec<ValidationError>, field: &str, value: Decimal) {
    if value.is_sign_negative() {
        errors.push(ValidationError::with_rule(
            field,
            format!("APR cannot be negative, got {value}"),
            "non_negative_apr",
        ));
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ValidationError::new("name", "Name cannot be empty"));
        }

        if self.min_runtime_secs <= HOUR {
            errors.push(ValidationError::with_rule(
                "min_runtime_secs",
                "Minimum runtime must exceed one hour",
                "min_runtime_above_hour",
            ));
        }

        if self.max_runtime_secs <= self.min_runtime_secs {
            errors.push(ValidationError::with_rule(
                "max_runtime_secs",
                "Maximum runtime must exceed minimum runtime",
                "ordered_runtime_bounds",
            ));
        }

        non_negative(&mut errors, "seed_bond_apr", self.seed_bond_apr);
        non_negative(&mut errors, "max_hourly_yield_apr", self.max_hourly_yield_apr);
        non_negative(
            &mut errors,
            "yield_change_apr_per_hour",
            self.yield_change_apr_per_hour,
        );
        non_negative(&mut errors, "borrowing_markup_apr", self.borrowing_markup_apr);
        non_negative(&mut errors, "borrow_min_apr", self.borrow_min_apr);

        if self.withdrawal_window_secs > HOUR {
            errors.push(ValidationError::with_rule(
                "withdrawal_window_secs",
                "Withdrawal window cannot exceed one hour",
                "max_withdrawal_window",
            ));
        }

        if self.speed.weight_divisor == 0 {
            errors.push(ValidationError::new(
                "speed.weight_divisor",
                "Weight divisor must be positive",
            ));
        }

        errors
    }
}
