//! Rotation Worker
//!
//! Runs a key rotator for one configured usage and rotates it on a fixed
//! interval. Readers (an API layer, crypto call sites) consume the rotator
//! through `current()` and `valid(kid)`; this binary only owns the
//! schedule and the process lifecycle.
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


use anyhow::Result;
use keywheel_config::{AppConfig, StoreBackendConfig};
use keywheel_keys::{FileKeyStore, KeyRotator, KeyStore, MemoryKeyStore, RotationScheduler};
use keywheel_logging::init_console_logging;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_console_logging("rotation-worker", "info");

    info!("Starting Rotation Worker");

    // Load configuration
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!(
        usage = %config.rotation.usage,
        rotation_interval_days = config.rotation.rotation_interval_days,
        grace_period_days = config.rotation.grace_period_days,
        "Configuration loaded"
    );

    // Select the storage backend
    let store: Arc<dyn KeyStore> = match &config.store {
        StoreBackendConfig::File { path } => {
            info!(path = %path, "Using file key store");
            Arc::new(
                FileKeyStore::new(path)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to open key store: {}", e))?,
            )
        }
        StoreBackendConfig::Memory => {
            info!("Using in-memory key store");
            Arc::new(MemoryKeyStore::new())
        }
    };

    // Construct the rotator (loads the persisted key or bootstraps one)
    let rotator = Arc::new(
        KeyRotator::with_store_timeout(
            config.rotation.usage,
            store,
            config.rotation.rotation_interval_days,
            config.rotation.grace_period_days,
            Duration::from_secs(config.rotation.store_timeout_secs),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to construct key rotator: {}", e))?,
    );

    info!(kid = %rotator.current().kid, "Current key ready");

    // Start the rotation schedule
    let period = Duration::from_secs(config.rotation.rotation_interval_days as u64 * 86_400);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = RotationScheduler::new(rotator.clone(), period);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    // Wait for shutdown signal
    info!("Rotation Worker running. Press Ctrl+C to stop.");
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    // Stop scheduling; an in-flight rotation runs to completion so the
    // store is never left mid-write.
    let _ = shutdown_tx.send(true);
    scheduler_handle.await?;
    info!("Rotation Worker stopped");

    Ok(())
}
