//! File-backed key record storage
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
use crate::record::KeyRecord;
use crate::store::KeyStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Stores one JSON record file per logical name under a directory.
///
/// `save` writes to a `.tmp` sibling and renames it over the target, so a
/// crash mid-write leaves either the old record or the new one on disk,
/// never a truncated file. At-rest encryption of the record files is the
/// deployment's concern (filesystem or volume level), not this store's.
pub struct FileKeyStore {
    storage_path: PathBuf,
}

impl FileKeyStore {
    /// Create a store rooted at `storage_path`, creating the directory if
    /// needed.
    pub async fn new<P: AsRef<Path>>(storage_path: P) -> KeyResult<Self> {
        let storage_path = storage_path.as_ref().to_path_buf();
        fs::create_dir_all(&storage_path).await?;
        info!(path = %storage_path.display(), "File key store initialized");
        Ok(Self { storage_path })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        // Sanitize the logical name for the filesystem
        let sanitized = name.replace(['/', '\\'], "_");
        self.storage_path.join(format!("{}.json", sanitized))
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn load(&self, name: &str) -> KeyResult<Option<KeyRecord>> {
        let path = self.record_path(name);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(name = name, "No persisted record");
                return Ok(None);
            }
            Err(e) => return Err(KeyError::Storage(format!("read {}: {}", path.display(), e))),
        };

        let record: KeyRecord = serde_json::from_str(&content).map_err(|e| {
            KeyError::Storage(format!("corrupt record {}: {}", path.display(), e))
        })?;

        debug!(name = name, kid = %record.kid, "Loaded persisted record");
        Ok(Some(record))
    }

    async fn save(&self, name: &str, record: &KeyRecord) -> KeyResult<()> {
        let path = self.record_path(name);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &path).await?;

        debug!(name = name, kid = %record.kid, "Persisted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SecretBytes;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_record(kid: &str) -> KeyRecord {
        let created_at = Utc::now();
        KeyRecord {
            kid: kid.to_string(),
            key: SecretBytes::new(vec![0xAB; 32]),
            created_at,
            expires_at: created_at + chrono::Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_missing_record_is_none_not_error() {
        let dir = tempdir().unwrap();
        let store = FileKeyStore::new(dir.path()).await.unwrap();
        assert!(store.load("aes256").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = FileKeyStore::new(dir.path()).await.unwrap();

        let record = sample_record("aes256-20260830T101502Z-000000-9f2ac1b4");
        store.save("aes256", &record).await.unwrap();

        let loaded = store.load("aes256").await.unwrap().unwrap();
        assert_eq!(loaded.kid, record.kid);
        assert_eq!(loaded.key.expose(), record.key.expose());
        assert_eq!(loaded.created_at, record.created_at);
        assert_eq!(loaded.expires_at, record.expires_at);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_record_atomically() {
        let dir = tempdir().unwrap();
        let store = FileKeyStore::new(dir.path()).await.unwrap();

        store.save("aes256", &sample_record("kid-one")).await.unwrap();
        store.save("aes256", &sample_record("kid-two")).await.unwrap();

        let loaded = store.load("aes256").await.unwrap().unwrap();
        assert_eq!(loaded.kid, "kid-two");
        // No temp file left behind after the rename
        assert!(!dir.path().join("aes256.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_storage_error() {
        let dir = tempdir().unwrap();
        let store = FileKeyStore::new(dir.path()).await.unwrap();

        tokio::fs::write(dir.path().join("aes256.json"), b"not json")
            .await
            .unwrap();

        let err = store.load("aes256").await.unwrap_err();
        assert!(matches!(err, KeyError::Storage(_)));
    }

    #[tokio::test]
    async fn test_name_is_sanitized_for_filesystem() {
        let dir = tempdir().unwrap();
        let store = FileKeyStore::new(dir.path()).await.unwrap();

        let record = sample_record("kid");
        store.save("tenant/aes256", &record).await.unwrap();
        assert!(dir.path().join("tenant_aes256.json").exists());
        assert!(store.load("tenant/aes256").await.unwrap().is_some());
    }
}
