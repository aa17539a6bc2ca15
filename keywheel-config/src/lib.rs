//! Configuration management for Keywheel services
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


use keywheel_keys::UsageType;
use serde::Deserialize;
use std::env;

/// Storage backend selection
///
/// Extensible to remote backends (a KMS entry would carry its endpoint and
/// credentials here) without changing the rotation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// JSON record files under a directory
    File { path: String },
    /// Ephemeral in-memory store (tests, throwaway environments)
    Memory,
}

/// Rotation parameters for one managed usage
#[derive(Debug, Clone, Deserialize)]
pub struct RotationConfig {
    pub usage: UsageType,
    pub rotation_interval_days: u32,
    pub grace_period_days: u32,
    pub store_timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub rotation: RotationConfig,
    pub store: StoreBackendConfig,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Invalid values fail here, before any key machinery is constructed:
    /// an unknown usage tag, an unknown backend tag, or a non-positive
    /// rotation interval never reaches the rotator.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let usage: UsageType = env::var("KEY_USAGE")
            .unwrap_or_else(|_| "aes256".to_string())
            .parse()
            .map_err(|e| config::ConfigError::Message(format!("KEY_USAGE: {}", e)))?;

        let rotation_interval_days = match env::var("KEY_ROTATION_INTERVAL_DAYS") {
            Ok(raw) => parse_days("KEY_ROTATION_INTERVAL_DAYS", &raw)?,
            Err(_) => usage.default_rotation_days(),
        };
        if rotation_interval_days == 0 {
            return Err(config::ConfigError::Message(
                "KEY_ROTATION_INTERVAL_DAYS must be at least 1".to_string(),
            ));
        }

        let grace_period_days = match env::var("KEY_GRACE_PERIOD_DAYS") {
            Ok(raw) => parse_days("KEY_GRACE_PERIOD_DAYS", &raw)?,
            Err(_) => 7,
        };

        let store_timeout_secs = match env::var("KEY_STORE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                config::ConfigError::Message(format!("KEY_STORE_TIMEOUT_SECS: {}", e))
            })?,
            Err(_) => 10,
        };

        let backend = env::var("KEY_STORE_BACKEND").unwrap_or_else(|_| "file".to_string());
        let store = match backend.to_ascii_lowercase().as_str() {
            "file" => StoreBackendConfig::File {
                path: env::var("KEY_STORAGE_PATH").unwrap_or_else(|_| "./keys".to_string()),
            },
            "memory" => StoreBackendConfig::Memory,
            other => {
                return Err(config::ConfigError::Message(format!(
                    "KEY_STORE_BACKEND: unsupported backend: {}",
                    other
                )))
            }
        };

        let log_level = env::var("LOG_LEVEL").ok();

        Ok(Self {
            rotation: RotationConfig {
                usage,
                rotation_interval_days,
                grace_period_days,
                store_timeout_secs,
            },
            store,
            log_level,
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

fn parse_days(var: &str, raw: &str) -> Result<u32, config::ConfigError> {
    raw.parse::<u32>()
        .map_err(|e| config::ConfigError::Message(format!("{}: {}", var, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days_rejects_garbage() {
        assert!(parse_days("KEY_GRACE_PERIOD_DAYS", "7").is_ok());
        assert!(parse_days("KEY_GRACE_PERIOD_DAYS", "-1").is_err());
        assert!(parse_days("KEY_GRACE_PERIOD_DAYS", "soon").is_err());
    }

    #[test]
    fn test_store_backend_deserializes_from_tagged_form() {
        let cfg: StoreBackendConfig =
            serde_json::from_str(r#"{"backend": "file", "path": "/var/lib/keywheel"}"#).unwrap();
        assert!(matches!(cfg, StoreBackendConfig::File { path } if path == "/var/lib/keywheel"));
    }
}
