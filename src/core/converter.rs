//! Currency conversion with a never-fail policy.
//!
//! A missing exchange rate is not an error here. Any lookup that cannot produce a usable rate
//! converts at [`FALLBACK_RATE`] and logs a warning.

use crate::core::currency::{CurrencyCatalog, CurrencyInfo, CurrencyRateProvider, CurrencySections};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate applied when no usable exchange rate exists for a currency pair.
pub const FALLBACK_RATE: f64 = 1.0;

pub struct CurrencyConverter {
    catalog: CurrencyCatalog,
    rates: Arc<dyn CurrencyRateProvider>,
    base_currency: String,
}

impl CurrencyConverter {
    pub fn new(
        catalog: CurrencyCatalog,
        rates: Arc<dyn CurrencyRateProvider>,
        base_currency: &str,
    ) -> Self {
        Self {
            catalog,
            rates,
            base_currency: base_currency.trim().to_ascii_uppercase(),
        }
    }

    /// Currency that expenses are aggregated in.
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn rates_version(&self) -> u64 {
        self.rates.version()
    }

    /// Rate from `from` to `to`. Equal codes short-circuit without a lookup.
    pub async fn rate(&self, from: &str, to: &str) -> f64 {
        let from = from.trim().to_ascii_uppercase();
        let to = to.trim().to_ascii_uppercase();
        if from == to {
            return 1.0;
        }

        match self.rates.get_rate(&from, &to).await {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                debug!("Rate {from} -> {to}: {rate}");
                rate
            }
            Ok(rate) => {
                warn!("Unusable rate {rate} for {from} -> {to}, converting at {FALLBACK_RATE}");
                FALLBACK_RATE
            }
            Err(e) => {
                warn!("No rate for {from} -> {to} ({e}), converting at {FALLBACK_RATE}");
                FALLBACK_RATE
            }
        }
    }

    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from.trim().eq_ignore_ascii_case(to.trim()) {
            return amount;
        }
        amount * self.rate(from, to).await
    }

    pub async fn convert_to_base(&self, amount: f64, from: &str) -> f64 {
        self.convert(amount, from, &self.base_currency).await
    }

    pub fn get_currency_info(&self, code: &str) -> Option<CurrencyInfo> {
        self.catalog.get(code).cloned()
    }

    pub fn search_currencies(&self, query: &str) -> Vec<CurrencyInfo> {
        self.catalog.search(query)
    }

    pub fn get_currency_sections(&self) -> CurrencySections {
        self.catalog.sections()
    }
}
