//! Best-effort result cache in front of the executor.
//!
//! Every cache failure is logged and swallowed; a broken cache only costs
//! a round trip to the database.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use querypage_core::traits::{CacheProvider, EnvelopeCodec, JsonCodec};
use querypage_core::types::Page;

/// Reads and writes cached envelopes and row counts.
#[derive(Debug, Clone)]
pub struct CacheGateway {
    provider: Option<Arc<dyn CacheProvider>>,
    codec: Arc<dyn EnvelopeCodec>,
    ttl: Duration,
}

impl CacheGateway {
    /// Create a gateway. Without a provider every operation is a no-op.
    pub fn new(provider: Option<Arc<dyn CacheProvider>>, ttl: Duration) -> Self {
        Self {
            provider,
            codec: Arc::new(JsonCodec),
            ttl,
        }
    }

    /// Replace the envelope codec.
    pub fn with_codec(mut self, codec: Arc<dyn EnvelopeCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Whether a provider is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Look up a cached envelope.
    ///
    /// Liveness is checked before the read; an entry that fails to decode
    /// is evicted so the next request repopulates it.
    pub async fn load_page(&self, key: &str) -> Option<Page> {
        let provider = self.provider.as_ref()?;
        match provider.exists(key).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(key, "Page cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Page cache lookup failed");
                return None;
            }
        }

        let raw = match provider.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Page cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Page cache read failed");
                return None;
            }
        };

        match self.codec.decode(&raw) {
            Ok(page) => {
                debug!(key, "Page cache hit");
                Some(page)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cached page");
                if let Err(e) = provider.delete(key).await {
                    warn!(key, error = %e, "Failed to evict undecodable cached page");
                }
                None
            }
        }
    }

    /// Store an envelope.
    pub async fn store_page(&self, key: &str, page: &Page) {
        let Some(provider) = &self.provider else {
            return;
        };
        let raw = match self.codec.encode(page) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode page for caching");
                return;
            }
        };
        if let Err(e) = provider.set(key, &raw, self.ttl).await {
            warn!(key, error = %e, "Page cache write failed");
        }
    }

    /// Look up a cached row count.
    pub async fn load_count(&self, key: &str) -> Option<u64> {
        let provider = self.provider.as_ref()?;
        match provider.get(key).await {
            Ok(Some(raw)) => raw.parse().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Count cache read failed");
                None
            }
        }
    }

    /// Store a row count.
    pub async fn store_count(&self, key: &str, total: u64) {
        let Some(provider) = &self.provider else {
            return;
        };
        if let Err(e) = provider.set(key, &total.to_string(), self.ttl).await {
            warn!(key, error = %e, "Count cache write failed");
        }
    }

    /// Drop every entry under each prefix in the background.
    pub fn clear_prefixes(&self, prefixes: Vec<String>) -> Option<JoinHandle<()>> {
        let provider = Arc::clone(self.provider.as_ref()?);
        Some(tokio::spawn(async move {
            for prefix in prefixes {
                match provider.delete_prefix(&prefix).await {
                    Ok(count) => debug!(prefix = %prefix, count, "Cleared cached pages"),
                    Err(e) => warn!(prefix = %prefix, error = %e, "Failed to clear cache prefix"),
                }
            }
        }))
    }

    /// Drop every entry in the background.
    pub fn clear_all(&self) -> Option<JoinHandle<()>> {
        let provider = Arc::clone(self.provider.as_ref()?);
        Some(tokio::spawn(async move {
            if let Err(e) = provider.flush_all().await {
                warn!(error = %e, "Failed to clear cache");
            }
        }))
    }
}
