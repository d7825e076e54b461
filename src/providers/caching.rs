use crate::core::currency::CurrencyRateProvider;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CachedRate {
    rate: f64,
    expires_at: Instant,
    source_version: u64,
}

/// Remembers successful lookups of an inner rate source for `ttl`.
///
/// Failures are not cached, so a source that comes back online is used on the next call.
/// Entries recorded against an older version of the inner source are ignored.
pub struct CachingRateProvider<P: CurrencyRateProvider> {
    inner: P,
    ttl: Duration,
    cache: Mutex<HashMap<String, CachedRate>>,
    generation: AtomicU64,
}

impl<P: CurrencyRateProvider> CachingRateProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("Rate cache CLEAR");
    }
}

#[async_trait]
impl<P: CurrencyRateProvider> CurrencyRateProvider for CachingRateProvider<P> {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let key = format!("{from}-{to}");
        let source_version = self.inner.version();
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&key) {
                if entry.source_version == source_version && entry.expires_at > Instant::now() {
                    debug!("Cache hit for currency rate: {}", key);
                    return Ok(entry.rate);
                }
                debug!("Cache entry expired for currency rate: {}", key);
            }
        }

        debug!("Cache miss for currency rate: {}", key);
        let rate = self.inner.get_rate(from, to).await?;

        let mut cache = self.cache.lock().await;
        let previous = cache.insert(
            key,
            CachedRate {
                rate,
                expires_at: Instant::now() + self.ttl,
                source_version,
            },
        );
        if previous.is_none_or(|p| p.rate != rate) {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        Ok(rate)
    }

    fn version(&self) -> u64 {
        self.inner
            .version()
            .wrapping_add(self.generation.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::AtomicUsize;

    struct MockInnerProvider {
        call_count: AtomicUsize,
        version: AtomicU64,
    }

    impl MockInnerProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                version: AtomicU64::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CurrencyRateProvider for MockInnerProvider {
        async fn get_rate(&self, from: &str, _to: &str) -> Result<f64> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if from == "EUR" {
                Ok(1.1)
            } else {
                Err(anyhow!("Unknown currency"))
            }
        }

        fn version(&self) -> u64 {
            self.version.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_successful_rates_are_cached() {
        let provider = CachingRateProvider::new(MockInnerProvider::new(), Duration::from_secs(60));

        assert_eq!(provider.get_rate("EUR", "USD").await.unwrap(), 1.1);
        assert_eq!(provider.get_rate("EUR", "USD").await.unwrap(), 1.1);
        assert_eq!(provider.inner.calls(), 1);

        provider.get_rate("EUR", "GBP").await.unwrap();
        assert_eq!(provider.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let provider = CachingRateProvider::new(MockInnerProvider::new(), Duration::from_secs(60));

        assert!(provider.get_rate("XYZ", "USD").await.is_err());
        assert!(provider.get_rate("XYZ", "USD").await.is_err());
        assert_eq!(provider.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let provider =
            CachingRateProvider::new(MockInnerProvider::new(), Duration::from_millis(10));

        provider.get_rate("EUR", "USD").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        provider.get_rate("EUR", "USD").await.unwrap();
        assert_eq!(provider.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_inner_version_change_invalidates() {
        let provider = CachingRateProvider::new(MockInnerProvider::new(), Duration::from_secs(60));

        provider.get_rate("EUR", "USD").await.unwrap();
        let before = provider.version();
        provider.inner.version.fetch_add(1, Ordering::SeqCst);
        assert_ne!(provider.version(), before);

        provider.get_rate("EUR", "USD").await.unwrap();
        assert_eq!(provider.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_drops_entries() {
        let provider = CachingRateProvider::new(MockInnerProvider::new(), Duration::from_secs(60));

        provider.get_rate("EUR", "USD").await.unwrap();
        provider.clear().await;
        provider.get_rate("EUR", "USD").await.unwrap();
        assert_eq!(provider.inner.calls(), 2);
    }
}
