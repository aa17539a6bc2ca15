//! Periodic rotation trigger
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


use crate::error::KeyError;
use crate::rotator::KeyRotator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Drives [`KeyRotator::rotate`] on a fixed interval.
///
/// The rotator does not know about timers; this is the in-process trigger
/// for deployments without an external one (cron, systemd timer). Rotation
/// failures are logged and the previous key stays serviceable; the loop
/// never crashes the process. Shutdown is observed only between ticks, so
/// an in-flight rotation always runs to completion and the store is never
/// left mid-write.
pub struct RotationScheduler {
    rotator: Arc<KeyRotator>,
    period: Duration,
}

impl RotationScheduler {
    pub fn new(rotator: Arc<KeyRotator>, period: Duration) -> Self {
        Self { rotator, period }
    }

    /// Run the trigger loop until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick fires immediately; the rotator already
        // bootstrapped a key at construction, so skip it.
        ticker.tick().await;

        info!(
            usage = %self.rotator.usage(),
            period_secs = self.period.as_secs(),
            "Rotation scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.rotator.rotate().await {
                        Ok(record) => {
                            info!(
                                usage = %self.rotator.usage(),
                                kid = %record.kid,
                                "Scheduled rotation completed"
                            );
                        }
                        Err(KeyError::RotationInProgress) => {
                            debug!(
                                usage = %self.rotator.usage(),
                                "Rotation already in flight, skipping tick"
                            );
                        }
                        Err(e) => {
                            error!(
                                usage = %self.rotator.usage(),
                                error = %e,
                                "Scheduled rotation failed, previous key remains current"
                            );
                        }
                    }
                }
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(usage = %self.rotator.usage(), "Rotation scheduler stopped");
    }
}
