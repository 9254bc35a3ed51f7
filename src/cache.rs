use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::time::{Duration, Instant, interval};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::metrics::COOLDOWN_ENTRIES;

/// Answer of the atomic set-if-absent primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// No live entry existed; one was written with the requested TTL.
    Acquired,
    /// A live entry already exists and expires in `remaining`.
    Held { remaining: Duration },
}

/// Shared key-value store with expiry.
///
/// Only one operation is exposed on purpose: a get followed by a set would let
/// two racing callers both see "absent".
#[async_trait]
pub trait CooldownStore: Send + Sync + 'static {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<Claim, StoreError>;
}

// Cooldown entry with expiry
#[derive(Debug, Clone)]
pub struct CooldownEntry {
    pub key: String,
    pub expires_at: Instant,
}

impl CooldownEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process store backed by a sharded map.
///
/// Atomicity per key comes from the shard write lock held by `entry()`.
#[derive(Default, Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CooldownEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries whose expiry has passed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.entries.len());
        COOLDOWN_ENTRIES.set(self.entries.len() as f64);
        removed
    }
}

#[async_trait]
impl CooldownStore for MemoryCache {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<Claim, StoreError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or(StoreError::TtlOverflow(ttl))?;
        let fresh = CooldownEntry {
            key: key.to_string(),
            expires_at,
        };

        let claim = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    Claim::Held {
                        remaining: occupied.get().expires_at - now,
                    }
                } else {
                    // expired but not swept yet
                    occupied.insert(fresh);
                    Claim::Acquired
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Claim::Acquired
            }
        };

        COOLDOWN_ENTRIES.set(self.entries.len() as f64);
        Ok(claim)
    }
}

// Sweeper - periodically reclaims expired entries
pub async fn cache_sweeper(cache: MemoryCache, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    info!(interval = ?sweep_interval, "Cooldown sweeper started");

    loop {
        interval.tick().await;

        let removed = cache.sweep_expired();
        if removed > 0 {
            debug!(removed, remaining = cache.len(), "Swept expired cooldown entries");
        }
    }
}
