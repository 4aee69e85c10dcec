//! Configuration for the ledger aggregator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Aggregation configuration
    pub aggregation: AggregationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "ledger-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            aggregation: AggregationConfig::default(),
        }
    }
}

/// Aggregation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// What to do with obligations whose payer is also the payee
    pub self_obligations: SelfObligationPolicy,
}

/// Handling of obligations where payer == payee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfObligationPolicy {
    /// Fail aggregation with `Error::SelfObligation`
    #[default]
    Reject,
    /// Skip the obligation; the party is not recorded
    Ignore,
}

impl FromStr for SelfObligationPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(crate::Error::Config(format!(
                "Unknown self obligation policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SelfObligationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(policy) = std::env::var("LEDGER_SELF_OBLIGATIONS") {
            config.aggregation.self_obligations = policy.parse()?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "ledger-core");
        assert_eq!(
            config.aggregation.self_obligations,
            SelfObligationPolicy::Reject
        );
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            [aggregation]
            self_obligations = "ignore"
            "#,
        )
        .unwrap();
        assert_eq!(config.service_name, "ledger-core");
        assert_eq!(
            config.aggregation.self_obligations,
            SelfObligationPolicy::Ignore
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "IGNORE".parse::<SelfObligationPolicy>().unwrap(),
            SelfObligationPolicy::Ignore
        );
        assert!("drop".parse::<SelfObligationPolicy>().is_err());
    }
}
