//! HTTP client for the internal monitor API.
//!
//! One client serves both lookups:
//! - `GET /api/internal/monitor/availability/{plan_code}` for per-plan
//!   availability snapshots
//! - `POST /api/internal/monitor/price` for tax-inclusive price quotes

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SourceSettings;
use crate::domain::AvailabilitySnapshot;
use crate::error::LookupError;
use crate::port::{AvailabilityLookup, PriceLookup, PriceQuote};

/// HTTP client for the internal monitor endpoints.
pub struct SourceClient {
    http: HttpClient,
    base_url: String,
}

impl SourceClient {
    #[must_use]
    pub fn from_config(settings: &SourceSettings) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AvailabilityLookup for SourceClient {
    async fn fetch_availability(
        &self,
        plan_code: &str,
    ) -> Result<AvailabilitySnapshot, LookupError> {
        let url = format!(
            "{}/api/internal/monitor/availability/{plan_code}",
            self.base_url
        );
        debug!(url = %url, "fetching availability");

        let snapshot = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<AvailabilitySnapshot>()
            .await?;
        Ok(snapshot)
    }
}

#[async_trait]
impl PriceLookup for SourceClient {
    async fn fetch_price(
        &self,
        plan_code: &str,
        datacenter: &str,
        options: &[String],
    ) -> Result<PriceQuote, LookupError> {
        let url = format!("{}/api/internal/monitor/price", self.base_url);
        debug!(url = %url, plan_code = %plan_code, datacenter = %datacenter, "fetching price");

        let response = self
            .http
            .post(&url)
            .json(&PriceRequest {
                plan_code,
                datacenter,
                options,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<PriceResponse>()
            .await?;
        quote_from_response(response)
    }
}

#[derive(Debug, Serialize)]
struct PriceRequest<'a> {
    plan_code: &'a str,
    datacenter: &'a str,
    options: &'a [String],
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    price: Option<PriceInfo>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceInfo {
    #[serde(default)]
    prices: Option<Prices>,
}

#[derive(Debug, Default, Deserialize)]
struct Prices {
    #[serde(rename = "withTax")]
    with_tax: Option<Decimal>,
    #[serde(rename = "currencyCode", default = "default_currency")]
    currency_code: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn quote_from_response(response: PriceResponse) -> Result<PriceQuote, LookupError> {
    let info = match (response.success, response.price) {
        (true, Some(info)) => info,
        _ => {
            let reason = response
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(LookupError::Price(reason));
        }
    };
    let prices = info.prices.unwrap_or_default();
    let Some(with_tax) = prices.with_tax else {
        return Err(LookupError::Price("quote carried no withTax amount".to_string()));
    };
    Ok(PriceQuote {
        price: with_tax,
        currency: prices.currency_code,
    })
}
