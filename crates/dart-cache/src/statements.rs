//! Time-boxed cache of full financial-statement result sets.

use chrono::{DateTime, TimeDelta, Utc};
use dart_core::clock::is_stale;
use dart_core::{
    Clock, DartStatus, DisclosureSource, Result, StatementKey, StatementRow, SystemClock,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

/// How long a statement result set is served before it is refetched.
pub const STATEMENT_TTL_HOURS: i64 = 6;

/// A cached upstream statement response.
///
/// Only successful and "no data" responses are ever cached; for the latter
/// `rows` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementCacheEntry {
    /// Every line item of the report, in upstream order.
    pub rows: Vec<StatementRow>,
    /// Embedded upstream status code.
    pub status: String,
    /// Embedded upstream message.
    pub message: String,
    /// When the response was fetched.
    pub fetched_at: DateTime<Utc>,
}

/// Cache of `fnlttSinglAcntAll` responses keyed by [`StatementKey`].
///
/// Entries are replaced wholesale once older than the TTL. Concurrent misses
/// on the same key share a single upstream fetch. A stale entry whose
/// refresh fails keeps serving; a missing entry propagates the failure and
/// nothing is cached.
#[derive(Debug)]
pub struct StatementCache {
    source: Arc<dyn DisclosureSource>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    entries: RwLock<HashMap<StatementKey, Arc<StatementCacheEntry>>>,
    // One lock per key ever fetched; grows with the key set like `entries`.
    inflight: Mutex<HashMap<StatementKey, Arc<Mutex<()>>>>,
}

impl StatementCache {
    /// Creates an empty cache backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn DisclosureSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            ttl: TimeDelta::hours(STATEMENT_TTL_HOURS),
            entries: RwLock::default(),
            inflight: Mutex::default(),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Overrides the freshness interval.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the cached entry for `key`, fetching it when absent or stale.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn get(&self, key: &StatementKey) -> Result<Arc<StatementCacheEntry>> {
        if let Some(entry) = self.fresh(key).await {
            debug!(rows = entry.rows.len(), "Cache hit for statements");
            return Ok(entry);
        }

        let key_lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key.clone()).or_default())
        };
        let _guard = key_lock.lock().await;

        if let Some(entry) = self.fresh(key).await {
            debug!("Statements fetched by a concurrent request");
            return Ok(entry);
        }

        debug!("Cache miss for statements");
        match self.fetch(key).await {
            Ok(entry) => {
                let entry = Arc::new(entry);
                self.entries
                    .write()
                    .await
                    .insert(key.clone(), Arc::clone(&entry));
                debug!(rows = entry.rows.len(), status = %entry.status, "Cached statements");
                Ok(entry)
            }
            Err(e) => {
                let stale = self.entries.read().await.get(key).cloned();
                match stale {
                    Some(entry) => {
                        warn!(
                            error = %e,
                            fetched_at = %entry.fetched_at,
                            "Statement refresh failed, serving stale entry"
                        );
                        Ok(entry)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Number of cached result sets, fresh or stale.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh(&self, key: &StatementKey) -> Option<Arc<StatementCacheEntry>> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| !is_stale(entry.fetched_at, now, self.ttl))
            .cloned()
    }

    async fn fetch(&self, key: &StatementKey) -> Result<StatementCacheEntry> {
        let envelope = self.source.statements(key).await?;
        envelope.ensure_ok(true)?;

        let rows = match envelope.dart_status() {
            DartStatus::NoData => Vec::new(),
            _ => envelope.body.list,
        };
        Ok(StatementCacheEntry {
            rows,
            status: envelope.status,
            message: envelope.message,
            fetched_at: self.clock.now(),
        })
    }
}
