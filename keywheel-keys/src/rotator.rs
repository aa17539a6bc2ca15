//! Key rotation orchestration
// Copyright 2025 Keywheel Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KeyError, KeyResult};
use crate::kid::KidGenerator;
use crate::material::KeyMaterialFactory;
use crate::record::{KeyRecord, SecretBytes};
use crate::store::KeyStore;
use crate::usage::UsageType;
use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default ceiling on a single store load/save
pub const DEFAULT_STORE_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Immutable snapshot of the key set.
///
/// Replaced wholesale on every rotation, never mutated in place, so readers
/// holding a previous snapshot stay consistent. `retained` is newest first
/// and never contains `current`.
struct KeyRing {
    current: Arc<KeyRecord>,
    retained: Vec<Arc<KeyRecord>>,
}

/// Owns the current key for one usage and rotates it on demand.
///
/// Readers call [`current`](KeyRotator::current) and
/// [`valid`](KeyRotator::valid) on every cryptographic operation; both are
/// lock-free loads of the ring snapshot and never block on an in-flight
/// rotation. [`rotate`](KeyRotator::rotate) calls are serialized: a second
/// caller gets [`KeyError::RotationInProgress`] instead of queueing, since
/// a duplicate rotation right behind a finished one has no value.
pub struct KeyRotator {
    usage: UsageType,
    rotation_interval: Duration,
    grace_period: Duration,
    store: Arc<dyn KeyStore>,
    store_timeout: StdDuration,
    factory: KeyMaterialFactory,
    kids: KidGenerator,
    ring: ArcSwap<KeyRing>,
    rotate_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRotator")
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

impl KeyRotator {
    /// Construct a rotator, loading the persisted key or bootstrapping one.
    ///
    /// A persisted record is adopted as current only if it has not passed
    /// its stored expiry; an expired-but-still-verifiable record is kept in
    /// the retained set so verification keeps working across restarts, and
    /// a fresh current key is generated and persisted.
    pub async fn new(
        usage: UsageType,
        store: Arc<dyn KeyStore>,
        rotation_interval_days: u32,
        grace_period_days: u32,
    ) -> KeyResult<Self> {
        Self::with_store_timeout(
            usage,
            store,
            rotation_interval_days,
            grace_period_days,
            DEFAULT_STORE_TIMEOUT,
        )
        .await
    }

    /// Like [`new`](KeyRotator::new), with an explicit store I/O timeout.
    pub async fn with_store_timeout(
        usage: UsageType,
        store: Arc<dyn KeyStore>,
        rotation_interval_days: u32,
        grace_period_days: u32,
        store_timeout: StdDuration,
    ) -> KeyResult<Self> {
        if rotation_interval_days == 0 {
            return Err(KeyError::Configuration(
                "rotation interval must be at least one day".to_string(),
            ));
        }

        let rotation_interval = Duration::days(rotation_interval_days as i64);
        let grace_period = Duration::days(grace_period_days as i64);
        let factory = KeyMaterialFactory::new(usage);
        let kids = KidGenerator::new();

        let now = Utc::now();
        let loaded = tokio::time::timeout(store_timeout, store.load(usage.tag()))
            .await
            .map_err(|_| {
                KeyError::Storage(format!("load timed out after {:?}", store_timeout))
            })??;

        let ring = match loaded {
            Some(record) if !record.is_expired(now) => {
                info!(
                    usage = %usage,
                    kid = %record.kid,
                    expires_at = %record.expires_at,
                    "Adopted persisted key as current"
                );
                KeyRing {
                    current: Arc::new(record),
                    retained: Vec::new(),
                }
            }
            loaded => {
                // Nothing usable as current: bootstrap a fresh key. A stale
                // record still inside its grace window stays verifiable.
                let mut retained = Vec::new();
                if let Some(stale) = loaded {
                    if stale.is_verifiable(grace_period, now) {
                        info!(
                            usage = %usage,
                            kid = %stale.kid,
                            "Retaining expired persisted key for verification"
                        );
                        retained.push(Arc::new(stale));
                    } else {
                        debug!(usage = %usage, kid = %stale.kid, "Discarding persisted key past grace period");
                    }
                }

                let record = Arc::new(Self::generate_record(
                    &factory,
                    &kids,
                    usage,
                    rotation_interval,
                    now,
                ));
                tokio::time::timeout(store_timeout, store.save(usage.tag(), &record))
                    .await
                    .map_err(|_| {
                        KeyError::Storage(format!("save timed out after {:?}", store_timeout))
                    })??;
                info!(
                    usage = %usage,
                    kid = %record.kid,
                    expires_at = %record.expires_at,
                    "Bootstrapped initial key"
                );
                KeyRing {
                    current: record,
                    retained,
                }
            }
        };

        Ok(Self {
            usage,
            rotation_interval,
            grace_period,
            store,
            store_timeout,
            factory,
            kids,
            ring: ArcSwap::from(Arc::new(ring)),
            rotate_lock: Mutex::new(()),
        })
    }

    /// The key to use for new encrypt/sign operations.
    ///
    /// Lock-free; safe to call concurrently with an in-flight rotation.
    pub fn current(&self) -> Arc<KeyRecord> {
        self.ring.load().current.clone()
    }

    /// Look up a key by kid for the verify/decrypt path.
    ///
    /// Returns the current key or a retained key still inside its grace
    /// window. `None` for an unknown or aged-out kid is the normal
    /// not-found outcome, not an error.
    pub fn valid(&self, kid: &str) -> Option<Arc<KeyRecord>> {
        let now = Utc::now();
        let ring = self.ring.load();
        if ring.current.kid == kid {
            return Some(ring.current.clone());
        }
        ring.retained
            .iter()
            .find(|r| r.kid == kid && r.is_verifiable(self.grace_period, now))
            .cloned()
    }

    /// Generate, persist, and publish a new current key.
    ///
    /// The swap is all or nothing: if persistence fails or times out, the
    /// previous key stays authoritative and the error is surfaced. On
    /// success the superseded key moves to the front of the retained set
    /// and entries past `expires_at + grace_period` are pruned.
    pub async fn rotate(&self) -> KeyResult<Arc<KeyRecord>> {
        let _guard = self
            .rotate_lock
            .try_lock()
            .map_err(|_| KeyError::RotationInProgress)?;

        let now = Utc::now();
        let record = Arc::new(Self::generate_record(
            &self.factory,
            &self.kids,
            self.usage,
            self.rotation_interval,
            now,
        ));

        // Persist before publishing: the old key remains authoritative
        // until the new one is durably stored.
        tokio::time::timeout(
            self.store_timeout,
            self.store.save(self.usage.tag(), &record),
        )
        .await
        .map_err(|_| KeyError::Storage(format!("save timed out after {:?}", self.store_timeout)))??;

        let prev = self.ring.load_full();
        let mut retained = Vec::with_capacity(prev.retained.len() + 1);
        retained.push(prev.current.clone());
        retained.extend(prev.retained.iter().cloned());
        let before_prune = retained.len();
        retained.retain(|r| r.is_verifiable(self.grace_period, now));
        let pruned = before_prune - retained.len();

        self.ring.store(Arc::new(KeyRing {
            current: record.clone(),
            retained,
        }));

        if pruned > 0 {
            debug!(usage = %self.usage, pruned = pruned, "Pruned keys past grace period");
        }
        info!(
            usage = %self.usage,
            kid = %record.kid,
            expires_at = %record.expires_at,
            retained = self.ring.load().retained.len(),
            "Rotated key"
        );
        Ok(record)
    }

    /// Kids currently resolvable via [`valid`](KeyRotator::valid), current
    /// key first. Diagnostic surface; key material is not exposed.
    pub fn active_kids(&self) -> Vec<String> {
        let now = Utc::now();
        let ring = self.ring.load();
        std::iter::once(ring.current.kid.clone())
            .chain(
                ring.retained
                    .iter()
                    .filter(|r| r.is_verifiable(self.grace_period, now))
                    .map(|r| r.kid.clone()),
            )
            .collect()
    }

    pub fn usage(&self) -> UsageType {
        self.usage
    }

    fn generate_record(
        factory: &KeyMaterialFactory,
        kids: &KidGenerator,
        usage: UsageType,
        rotation_interval: Duration,
        now: DateTime<Utc>,
    ) -> KeyRecord {
        KeyRecord {
            kid: kids.next(usage, now),
            key: SecretBytes::new(factory.generate()),
            created_at: now,
            expires_at: now + rotation_interval,
        }
    }
}
