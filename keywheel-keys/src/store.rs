//! Persistence boundary for key records
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


use crate::error::KeyResult;
use crate::record::KeyRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Trait for key persistence backends
///
/// A pure bytes-under-a-name boundary with no rotation semantics. Backends
/// implement this for local files today and remote key-management services
/// later:
/// - `FileKeyStore` (current implementation)
/// - AWS KMS / Azure Key Vault / HashiCorp Vault (future)
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Load the record stored under `name`.
    ///
    /// `Ok(None)` means nothing is stored there yet; that is a normal
    /// outcome, not an error. `Err` is reserved for real backend failures.
    async fn load(&self, name: &str) -> KeyResult<Option<KeyRecord>>;

    /// Store `record` under `name`, replacing any previous record.
    ///
    /// Must be durable before returning: a reader must never observe a
    /// partially written record, even across a crash mid-save.
    async fn save(&self, name: &str, record: &KeyRecord) -> KeyResult<()>;
}

/// In-memory store, for tests and ephemeral deployments
#[derive(Default)]
pub struct MemoryKeyStore {
    records: RwLock<HashMap<String, KeyRecord>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn load(&self, name: &str) -> KeyResult<Option<KeyRecord>> {
        let records = self.records.read().await;
        Ok(records.get(name).cloned())
    }

    async fn save(&self, name: &str, record: &KeyRecord) -> KeyResult<()> {
        let mut records = self.records.write().await;
        records.insert(name.to_string(), record.clone());
        Ok(())
    }
}
