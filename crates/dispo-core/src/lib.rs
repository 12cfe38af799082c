pub mod app_config;
pub mod config;
pub mod format;
pub mod model;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use format::{calculate_discount, format_price, round_secs};
pub use model::{
    retain_on_special, AggregateResult, SpecialProduct, Store, StoreRef, StoreSpecials, Variant,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
