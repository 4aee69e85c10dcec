//! Configuration for the settlement engine

use ledger_core::{AggregationConfig, SelfObligationPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Obligation aggregation configuration
    pub aggregation: AggregationConfig,

    /// Netting configuration
    pub netting: NettingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settlement-engine".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            aggregation: AggregationConfig::default(),
            netting: NettingConfig::default(),
        }
    }
}

/// Netting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NettingConfig {
    /// Largest balance total still accepted as zero
    ///
    /// Balances derived from a ledger are exact, so the default is zero.
    /// Callers supplying balances computed elsewhere may need slack.
    pub balance_tolerance: Decimal,

    /// Order in which debtors and creditors are matched
    pub ordering: MatchOrdering,
}

impl Default for NettingConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: Decimal::ZERO,
            ordering: MatchOrdering::FirstAppearance,
        }
    }
}

/// Debtor/creditor queue ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrdering {
    /// Order in which parties first appear in the obligations
    #[default]
    FirstAppearance,
    /// Largest amount first, first-appearance order on ties
    LargestFirst,
}

impl FromStr for MatchOrdering {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_appearance" => Ok(Self::FirstAppearance),
            "largest_first" => Ok(Self::LargestFirst),
            other => Err(crate::Error::Config(format!(
                "Unknown match ordering: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for MatchOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstAppearance => write!(f, "first_appearance"),
            Self::LargestFirst => write!(f, "largest_first"),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(tolerance) = std::env::var("SETTLEMENT_BALANCE_TOLERANCE") {
            config.netting.balance_tolerance = tolerance.trim().parse().map_err(|e| {
                crate::Error::Config(format!("Invalid balance tolerance {}: {}", tolerance, e))
            })?;
        }

        if let Ok(ordering) = std::env::var("SETTLEMENT_MATCH_ORDERING") {
            config.netting.ordering = ordering.parse()?;
        }

        if let Ok(policy) = std::env::var("SETTLEMENT_SELF_OBLIGATIONS") {
            config.aggregation.self_obligations = policy.parse::<SelfObligationPolicy>()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        if self.netting.balance_tolerance < Decimal::ZERO {
            return Err(crate::Error::Config(format!(
                "Balance tolerance must not be negative: {}",
                self.netting.balance_tolerance
            )));
        }
        Ok(())
    }
}
