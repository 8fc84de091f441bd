//! Exchange rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Which of the published rates drives the conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    #[default]
    #[serde(alias = "bcv")]
    Official,
    #[serde(alias = "paralelo")]
    Market,
    #[serde(alias = "promedio")]
    Average,
}

impl RateMode {
    pub const ALL: [RateMode; 3] = [RateMode::Official, RateMode::Market, RateMode::Average];
}

impl Display for RateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateMode::Official => "Official",
                RateMode::Market => "Market",
                RateMode::Average => "Average",
            }
        )
    }
}

impl FromStr for RateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "official" | "bcv" => Ok(RateMode::Official),
            "market" | "paralelo" => Ok(RateMode::Market),
            "average" | "promedio" => Ok(RateMode::Average),
            _ => Err(anyhow::anyhow!("Invalid rate mode: {}", s)),
        }
    }
}

/// The latest pair of published rates (VES per USD) and when they were updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub official_rate: Decimal,
    pub market_rate: Decimal,
    pub last_updated: DateTime<FixedOffset>,
}

impl RateSnapshot {
    /// Returns the rate selected by `mode`, or `None` when it cannot be computed.
    ///
    /// A non-positive component is treated as missing, so the average needs
    /// both rates to be present.
    pub fn rate_for(&self, mode: RateMode) -> Option<Decimal> {
        let official = Some(self.official_rate).filter(|r| *r > Decimal::ZERO);
        let market = Some(self.market_rate).filter(|r| *r > Decimal::ZERO);

        match mode {
            RateMode::Official => official,
            RateMode::Market => market,
            RateMode::Average => match (official, market) {
                (Some(o), Some(m)) => Some((o + m) / Decimal::TWO),
                _ => None,
            },
        }
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(official: Decimal, market: Decimal) -> RateSnapshot {
        RateSnapshot {
            official_rate: official,
            market_rate: market,
            last_updated: DateTime::parse_from_rfc3339("2025-01-10T12:00:00Z").unwrap(),
        }
    }

    #[test]
    fn test_rate_for_each_mode() {
        let snap = snapshot(Decimal::new(3650, 2), Decimal::new(4000, 2));
        assert_eq!(snap.rate_for(RateMode::Official), Some(Decimal::new(3650, 2)));
        assert_eq!(snap.rate_for(RateMode::Market), Some(Decimal::new(4000, 2)));
        assert_eq!(snap.rate_for(RateMode::Average), Some(Decimal::new(3825, 2)));
    }

    #[test]
    fn test_average_requires_both_rates() {
        let snap = snapshot(Decimal::new(3650, 2), Decimal::ZERO);
        assert_eq!(snap.rate_for(RateMode::Official), Some(Decimal::new(3650, 2)));
        assert_eq!(snap.rate_for(RateMode::Market), None);
        assert_eq!(snap.rate_for(RateMode::Average), None);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("official".parse::<RateMode>().unwrap(), RateMode::Official);
        assert_eq!("BCV".parse::<RateMode>().unwrap(), RateMode::Official);
        assert_eq!("paralelo".parse::<RateMode>().unwrap(), RateMode::Market);
        assert_eq!(" Average ".parse::<RateMode>().unwrap(), RateMode::Average);
        assert_eq!("promedio".parse::<RateMode>().unwrap(), RateMode::Average);

        let err = "weekly".parse::<RateMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid rate mode: weekly");
    }

    #[test]
    fn test_mode_serde_aliases() {
        let mode: RateMode = serde_yaml::from_str("paralelo").unwrap();
        assert_eq!(mode, RateMode::Market);
        let mode: RateMode = serde_yaml::from_str("average").unwrap();
        assert_eq!(mode, RateMode::Average);
        assert_eq!(serde_yaml::to_string(&RateMode::Official).unwrap().trim(), "official");
    }
}
