//! Configuration for batch runs.

use serde::Deserialize;

/// What to do with trailing text that never reached a `;`.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnterminatedPolicy {
    /// Discard it with a warning.
    #[default]
    Drop,
    /// Execute it as a final statement.
    Execute,
}

impl std::str::FromStr for UnterminatedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "execute" => Ok(Self::Execute),
            _ => Err(format!("invalid policy: {s}. Choose: drop, execute")),
        }
    }
}

/// Batch settings.
///
/// Loaded from the `[batch]` section of `graphload.toml` or
/// `GRAPHLOAD__BATCH__` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub on_unterminated: UnterminatedPolicy,

    /// Where to write the JSON run report, if anywhere.
    #[serde(default)]
    pub report_path: Option<String>,
}

impl BatchConfig {
    pub fn from_config(cfg: &config::Config) -> Result<Self, config::ConfigError> {
        match cfg.get::<BatchConfig>("batch") {
            Ok(c) => Ok(c),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}
