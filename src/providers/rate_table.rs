use crate::core::config::RateConfig;
use crate::core::currency::{CurrencyRateProvider, normalize_code};
use crate::core::error::TripError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

type Pair = (String, String);

/// Pair-keyed exchange rates held in memory and refreshed from outside.
///
/// A lookup tries the stored pair, then its inverse, then a cross through the pivot currency.
pub struct RateTable {
    pivot: String,
    rates: RwLock<HashMap<Pair, f64>>,
    version: AtomicU64,
}

fn validated(from: &str, to: &str, rate: f64) -> Result<(Pair, f64), TripError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(TripError::InvalidInput(format!(
            "exchange rate {from} -> {to} must be positive, got {rate}"
        )));
    }
    Ok(((normalize_code(from)?, normalize_code(to)?), rate))
}

impl RateTable {
    pub fn new(pivot: &str) -> Self {
        Self {
            pivot: pivot.trim().to_ascii_uppercase(),
            rates: RwLock::new(HashMap::new()),
            version: AtomicU64::new(0),
        }
    }

    pub fn from_config(pivot: &str, rates: &[RateConfig]) -> Result<Self, TripError> {
        let mut table = HashMap::new();
        for r in rates {
            let (pair, rate) = validated(&r.from, &r.to, r.rate)?;
            table.insert(pair, rate);
        }
        Ok(Self {
            pivot: pivot.trim().to_ascii_uppercase(),
            rates: RwLock::new(table),
            version: AtomicU64::new(0),
        })
    }

    pub async fn set_rate(&self, from: &str, to: &str, rate: f64) -> Result<(), TripError> {
        let (pair, rate) = validated(from, to, rate)?;
        self.rates.write().await.insert(pair, rate);
        self.version.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Swaps the whole table in one step. Nothing changes if any entry is invalid.
    pub async fn replace_all(&self, rates: &[RateConfig]) -> Result<(), TripError> {
        let mut table = HashMap::new();
        for r in rates {
            let (pair, rate) = validated(&r.from, &r.to, r.rate)?;
            table.insert(pair, rate);
        }
        *self.rates.write().await = table;
        self.version.fetch_add(1, Ordering::SeqCst);
        debug!("Rate table replaced with {} pairs", rates.len());
        Ok(())
    }

    async fn lookup(&self, from: &str, to: &str) -> Option<f64> {
        let rates = self.rates.read().await;
        let direct = |a: &str, b: &str| -> Option<f64> {
            if a == b {
                return Some(1.0);
            }
            rates
                .get(&(a.to_string(), b.to_string()))
                .copied()
                .or_else(|| {
                    rates
                        .get(&(b.to_string(), a.to_string()))
                        .map(|rate| 1.0 / rate)
                })
        };

        direct(from, to).or_else(|| {
            let leg_in = direct(from, &self.pivot)?;
            let leg_out = direct(&self.pivot, to)?;
            Some(leg_in * leg_out)
        })
    }
}

#[async_trait]
impl CurrencyRateProvider for RateTable {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let from = from.trim().to_ascii_uppercase();
        let to = to.trim().to_ascii_uppercase();
        self.lookup(&from, &to)
            .await
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {from}{to}"))
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}
