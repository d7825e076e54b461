use crate::core::currency::CurrencyRateProvider;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Asks each source in order and returns the first rate found.
pub struct ChainedRateProvider {
    sources: Vec<Arc<dyn CurrencyRateProvider>>,
}

impl ChainedRateProvider {
    pub fn new(sources: Vec<Arc<dyn CurrencyRateProvider>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl CurrencyRateProvider for ChainedRateProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let mut errors = Vec::new();
        for source in &self.sources {
            match source.get_rate(from, to).await {
                Ok(rate) => return Ok(rate),
                Err(e) => {
                    debug!("Rate source failed for {from} -> {to}: {e}");
                    errors.push(e.to_string());
                }
            }
        }
        Err(anyhow!(
            "No source has a rate for {} -> {}: [{}]",
            from,
            to,
            errors.join("; ")
        ))
    }

    fn version(&self) -> u64 {
        self.sources
            .iter()
            .fold(0u64, |acc, source| acc.wrapping_add(source.version()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RateConfig;
    use crate::providers::rate_table::RateTable;

    fn table(from: &str, to: &str, rate: f64) -> Arc<RateTable> {
        Arc::new(
            RateTable::from_config(
                "USD",
                &[RateConfig {
                    from: from.to_string(),
                    to: to.to_string(),
                    rate,
                }],
            )
            .unwrap(),
        )
    }

    fn chain_of(tables: Vec<Arc<RateTable>>) -> ChainedRateProvider {
        ChainedRateProvider::new(
            tables
                .into_iter()
                .map(|t| t as Arc<dyn CurrencyRateProvider>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let chain = chain_of(vec![table("EUR", "USD", 1.1), table("EUR", "USD", 1.5)]);
        assert_eq!(chain.get_rate("EUR", "USD").await.unwrap(), 1.1);
    }

    #[tokio::test]
    async fn test_falls_through_to_later_source() {
        let chain = chain_of(vec![table("GBP", "USD", 1.3), table("EUR", "USD", 1.1)]);
        assert_eq!(chain.get_rate("EUR", "USD").await.unwrap(), 1.1);

        let err = chain.get_rate("CHF", "JPY").await.unwrap_err();
        assert!(err.to_string().starts_with("No source has a rate for CHF -> JPY"));
    }

    #[tokio::test]
    async fn test_version_tracks_sources() {
        let first = table("GBP", "USD", 1.3);
        let chain = chain_of(vec![first.clone(), table("EUR", "USD", 1.1)]);

        let before = chain.version();
        first.set_rate("GBP", "USD", 1.4).await.unwrap();
        assert_eq!(chain.version(), before + 1);
    }
}
