//! lendcurve Configuration Layer
//!
//! Loads, validates and converts the tunable parameters of the lending
//! engine.
//!
//! # Features
//!
//! - **Runtime Bounds**: Shortest and longest fixed-term runtimes
//! - **Rates**: Seed, ceiling, drift, borrow markup and borrow floor, all as APR
//! - **Hourly Market**: Withdrawal window and flow-speed weighting
//! - **Formats**: TOML and JSON, from text or from a file chosen by extension
//!
//! # Example
//!
//! ```rust
//! use lendcurve_config::{EngineConfig, Validate};
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     name = "cross-margin"
//!     min_runtime_secs = 2592000
//!     max_runtime_secs = 31536000
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(config.is_valid());
//! let params = config.rate_parameters().unwrap();
//! assert_eq!(params.seed_hourly_interest_fp, 539_322);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;

pub use engine::{EngineConfig, SpeedConfig};
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::engine::{EngineConfig, SpeedConfig};
    pub use crate::error::{ConfigError, ConfigResult, Validate};
}
