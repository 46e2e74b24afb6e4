//! Address registry — RDMA endpoints that agents register over HTTP.
//!
//! Records have no explicit TTL. A record goes stale once it has not been
//! re-registered for `ADDRESS_TTL_SECS`, and is removed by a sweep that runs
//! lazily from `register` and `snapshot` at most once per
//! `SWEEP_INTERVAL_SECS`. The registry is capped at `MAX_ADDRESS_ENTRIES`;
//! going over the cap clears it completely.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use pingweave_core::address::{AddressRecord, AddressRegistration, ValidationError};

/// A record older than this (strictly) is evicted by the next sweep.
pub const ADDRESS_TTL_SECS: u64 = 300;

/// Minimum spacing between two sweeps.
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Hard cap on registered endpoints.
pub const MAX_ADDRESS_ENTRIES: usize = 10_000;

/// What happened to an accepted registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Record stored; `entries` is the registry size afterwards.
    Stored { entries: usize },
    /// Record stored, then the registry went over the cap and was cleared.
    Reset { dropped: usize },
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, AddressRecord>,
    /// Epoch seconds of the last sweep. Zero means never swept.
    checkpoint: u64,
}

impl Inner {
    fn sweep_if_due(&mut self, now: u64) {
        if now.saturating_sub(self.checkpoint) < SWEEP_INTERVAL_SECS {
            return;
        }
        self.records.retain(|ip, record| {
            let keep = record.age(now) <= ADDRESS_TTL_SECS;
            if !keep {
                tracing::error!(ip = %ip, age = record.age(now), "expired address removed");
            }
            keep
        });
        self.checkpoint = now;
    }
}

/// Shared handle to the registry. Clones share the same records.
#[derive(Clone, Default)]
pub struct AddressRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and upsert a registration, stamping it with `now`.
    ///
    /// A rejected registration leaves the registry untouched.
    pub async fn register(
        &self,
        registration: AddressRegistration,
        now: u64,
    ) -> Result<RegisterOutcome, ValidationError> {
        let record = registration.validate(now)?;

        let mut inner = self.inner.lock().await;
        inner.sweep_if_due(now);
        inner.records.insert(record.ip_address.clone(), record);

        let entries = inner.records.len();
        if entries > MAX_ADDRESS_ENTRIES {
            tracing::error!(
                critical = true,
                entries,
                limit = MAX_ADDRESS_ENTRIES,
                "too many entries in address store, clearing it; check agent configuration"
            );
            inner.records.clear();
            return Ok(RegisterOutcome::Reset { dropped: entries });
        }

        Ok(RegisterOutcome::Stored { entries })
    }

    /// All live records, ordered by IP. Runs the sweep first if one is due.
    pub async fn snapshot(&self, now: u64) -> BTreeMap<String, AddressRecord> {
        let mut inner = self.inner.lock().await;
        inner.sweep_if_due(now);
        inner
            .records
            .iter()
            .map(|(ip, record)| (ip.clone(), record.clone()))
            .collect()
    }

    /// Current record count, without sweeping.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
