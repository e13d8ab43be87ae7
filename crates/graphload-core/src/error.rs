use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: missing required setting(s): {}", fields.join(", "))]
    Missing { fields: Vec<&'static str> },

    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
