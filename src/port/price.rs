//! Price lookup port.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::LookupError;

/// A tax-inclusive monthly price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Decimal,
    /// ISO currency code, e.g. `"EUR"`.
    pub currency: String,
}

impl PriceQuote {
    /// Message-ready rendering, e.g. `"€24.99/month"`.
    #[must_use]
    pub fn display(&self) -> String {
        let symbol = match self.currency.as_str() {
            "EUR" => "€",
            "USD" => "$",
            other => other,
        };
        format!("{symbol}{:.2}/month", self.price)
    }
}

/// Source of price quotes for a plan at a location.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn fetch_price(
        &self,
        plan_code: &str,
        datacenter: &str,
        options: &[String],
    ) -> Result<PriceQuote, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_uses_euro_symbol() {
        let quote = PriceQuote {
            price: dec!(24.99),
            currency: "EUR".to_string(),
        };
        assert_eq!(quote.display(), "€24.99/month");
    }

    #[test]
    fn display_uses_dollar_symbol() {
        let quote = PriceQuote {
            price: dec!(31.50),
            currency: "USD".to_string(),
        };
        assert_eq!(quote.display(), "$31.50/month");
    }

    #[test]
    fn display_falls_back_to_currency_code() {
        let quote = PriceQuote {
            price: dec!(199),
            currency: "PLN".to_string(),
        };
        assert_eq!(quote.display(), "PLN199.00/month");
    }
}
