//! Versioned key records and secret byte handling
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


use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw key material that zeroizes on drop and redacts itself from `Debug`.
///
/// Serializes as hex for the persisted record; must never reach tracing
/// output or diagnostics.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes. Callers on the crypto path only.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([redacted; {}])", self.0.len())
    }
}

impl Serialize for SecretBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for SecretBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(&encoded).map_err(serde::de::Error::custom)?;
        Ok(SecretBytes(bytes))
    }
}

/// One generated key, immutable once created.
///
/// Lifecycle: active (the rotator's current key) -> retained (superseded
/// but inside the grace window, verification only) -> pruned. The record
/// itself never changes; the rotator moves it between those sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Key identifier, unique across the whole rotation history
    pub kid: String,
    /// Key material
    pub key: SecretBytes,
    /// When this key was generated
    pub created_at: DateTime<Utc>,
    /// When this key stops being used for new encrypt/sign operations
    pub expires_at: DateTime<Utc>,
}

impl KeyRecord {
    /// Past nominal expiry: no longer fit to serve as the current key
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Last instant this key may still be used to verify or decrypt
    pub fn verifiable_until(&self, grace_period: Duration) -> DateTime<Utc> {
        self.expires_at + grace_period
    }

    /// Still acceptable on the verify/decrypt path
    pub fn is_verifiable(&self, grace_period: Duration, now: DateTime<Utc>) -> bool {
        now < self.verifiable_until(grace_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(created: &str, expires: &str) -> KeyRecord {
        KeyRecord {
            kid: "aes256-20260830T101502Z-000000-9f2ac1b4".to_string(),
            key: SecretBytes::new(vec![7u8; 32]),
            created_at: created.parse().unwrap(),
            expires_at: expires.parse().unwrap(),
        }
    }

    #[test]
    fn test_expiry_and_grace_window() {
        let rec = record("2026-08-01T00:00:00Z", "2026-08-31T00:00:00Z");
        let grace = Duration::days(7);

        let before_expiry = "2026-08-30T23:59:59Z".parse().unwrap();
        assert!(!rec.is_expired(before_expiry));
        assert!(rec.is_verifiable(grace, before_expiry));

        let in_grace = "2026-09-03T00:00:00Z".parse().unwrap();
        assert!(rec.is_expired(in_grace));
        assert!(rec.is_verifiable(grace, in_grace));

        let past_grace = "2026-09-07T00:00:00Z".parse().unwrap();
        assert!(!rec.is_verifiable(grace, past_grace));
    }

    #[test]
    fn test_debug_never_prints_key_bytes() {
        let rec = record("2026-08-01T00:00:00Z", "2026-08-31T00:00:00Z");
        let rendered = format!("{:?}", rec);
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("07070707"));
    }

    #[test]
    fn test_serde_round_trips_key_bytes_exactly() {
        let rec = record("2026-08-01T00:00:00Z", "2026-08-31T00:00:00Z");
        let json = serde_json::to_string(&rec).unwrap();
        let back: KeyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kid, rec.kid);
        assert_eq!(back.key.expose(), rec.key.expose());
        assert_eq!(back.created_at, rec.created_at);
        assert_eq!(back.expires_at, rec.expires_at);
    }
}
