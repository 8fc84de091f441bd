use crate::core::rate::{RateProvider, RateSnapshot};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct DollarApiResponse {
    bcv: BcvQuote,
    paralelo: ParaleloQuote,
}

#[derive(Debug, Deserialize)]
struct BcvQuote {
    precio_bcv: f64,
    fecha_actualizacion: String,
}

#[derive(Debug, Deserialize)]
struct ParaleloQuote {
    precio_paralelo: f64,
}

/// Fetches official (BCV) and parallel market rates from the dollar API.
pub struct DollarApiProvider {
    endpoint: String,
    client: reqwest::Client,
}

impl DollarApiProvider {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dolarve/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    fn parse_rate(value: f64, name: &str) -> Result<Decimal> {
        Decimal::try_from(value).map_err(|e| anyhow!("Invalid {name} rate {value}: {e}"))
    }

    /// Accepts RFC 3339, a naive date-time (read as UTC) or a bare date (UTC midnight).
    fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Ok(ts);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
        }
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .with_context(|| format!("Failed to parse update timestamp: {value}"))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Failed to parse update timestamp: {value}"))?;
        Ok(Utc.from_utc_datetime(&midnight).fixed_offset())
    }
}

#[async_trait]
impl RateProvider for DollarApiProvider {
    #[instrument(name = "DollarApiFetch", skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_rates(&self) -> Result<RateSnapshot> {
        debug!("Requesting rates from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, self.endpoint))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from {}",
                response.status(),
                self.endpoint
            ));
        }

        let text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let data: DollarApiResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse rates response");
                return Err(anyhow!(
                    "Failed to parse JSON response from {}: {}",
                    self.endpoint,
                    e
                ));
            }
        };

        let snapshot = RateSnapshot {
            official_rate: Self::parse_rate(data.bcv.precio_bcv, "official")?,
            market_rate: Self::parse_rate(data.paralelo.precio_paralelo, "market")?,
            last_updated: Self::parse_timestamp(&data.bcv.fecha_actualizacion)?,
        };
        debug!(?snapshot, "Received rates");
        Ok(snapshot)
    }
}
