//! Ticker to corporate-identifier resolution.

use chrono::{DateTime, TimeDelta, Utc};
use dart_core::clock::is_stale;
use dart_core::{Clock, CorporateRecord, DartError, DisclosureSource, Result, SystemClock, Ticker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::manifest::parse_archive;

/// How long a corp-code snapshot is served before a refresh is attempted.
pub const CORP_CODE_TTL_HOURS: i64 = 24;

/// One complete generation of the corp-code map.
#[derive(Debug)]
struct Snapshot {
    records: HashMap<Ticker, CorporateRecord>,
    refreshed_at: DateTime<Utc>,
}

/// Daily-refreshed ticker -> [`CorporateRecord`] lookup.
///
/// The map is replaced wholesale: readers always see either the previous
/// complete snapshot or the new one. Refresh happens lazily on the first
/// lookup that finds the snapshot missing or stale, and only one refresh
/// runs at a time. When a refresh fails the previous snapshot keeps serving;
/// on a cold start the failure is returned to the caller.
#[derive(Debug)]
pub struct CorpCodeResolver {
    source: Arc<dyn DisclosureSource>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    refresh: Mutex<()>,
}

impl CorpCodeResolver {
    /// Creates a cold resolver backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn DisclosureSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            ttl: TimeDelta::hours(CORP_CODE_TTL_HOURS),
            snapshot: RwLock::new(None),
            refresh: Mutex::new(()),
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

    /// Resolves a ticker against the current snapshot, refreshing it if needed.
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn resolve(&self, ticker: &Ticker) -> Result<CorporateRecord> {
        let snapshot = self.current().await?;
        match snapshot.records.get(ticker) {
            Some(record) => {
                debug!(corp_code = %record.corp_code, "Resolved ticker");
                Ok(record.clone())
            }
            None => Err(DartError::NotFound(ticker.to_string())),
        }
    }

    /// Downloads and installs a fresh snapshot regardless of age.
    ///
    /// Returns the number of listed companies in the new snapshot. On failure
    /// the previous snapshot is left untouched.
    pub async fn refresh(&self) -> Result<usize> {
        let _guard = self.refresh.lock().await;
        let snapshot = self.load().await?;
        Ok(snapshot.records.len())
    }

    /// Number of tickers in the current snapshot.
    pub async fn len(&self) -> usize {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map_or(0, |s| s.records.len())
    }

    /// Returns true if no snapshot is installed or it holds no tickers.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// When the current snapshot was installed.
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|s| s.refreshed_at)
    }

    async fn fresh(&self) -> Option<Arc<Snapshot>> {
        let now = self.clock.now();
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|s| !is_stale(s.refreshed_at, now, self.ttl))
            .cloned()
    }

    async fn current(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.fresh().await {
            return Ok(snapshot);
        }

        let _guard = self.refresh.lock().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(snapshot) = self.fresh().await {
            return Ok(snapshot);
        }

        match self.load().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let previous = self.snapshot.read().await.clone();
                match previous {
                    Some(stale) => {
                        warn!(
                            error = %e,
                            refreshed_at = %stale.refreshed_at,
                            "Corp-code refresh failed, serving previous snapshot"
                        );
                        Ok(stale)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Fetches, parses and installs a new snapshot. Caller holds `refresh`.
    async fn load(&self) -> Result<Arc<Snapshot>> {
        debug!(source = self.source.name(), "Downloading corp-code manifest");
        let archive = self.source.corp_code_archive().await?;
        let records = parse_archive(&archive)?;

        let snapshot = Arc::new(Snapshot {
            records,
            refreshed_at: self.clock.now(),
        });
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));

        info!(tickers = snapshot.records.len(), "Installed corp-code snapshot");
        Ok(snapshot)
    }
}
