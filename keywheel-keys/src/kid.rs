//! Key identifier derivation
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


use crate::usage::UsageType;
use chrono::{DateTime, Utc};
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

/// Derives unique, creation-ordered key identifiers.
///
/// A kid looks like `aes256-20260830T101502Z-000003-9f2ac1b4`: usage tag,
/// UTC timestamp at second resolution, a process-local sequence number, and
/// a random suffix. Kids for one usage sort lexically by creation time. The
/// sequence number separates rotations that land in the same second; the
/// random suffix separates process restarts within the same second.
#[derive(Debug)]
pub struct KidGenerator {
    seq: AtomicU64,
}

impl KidGenerator {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
        }
    }

    /// Derive the next kid for `usage` created at `at`
    pub fn next(&self, usage: UsageType, at: DateTime<Utc>) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let mut suffix = [0u8; 4];
        rand::rngs::OsRng.fill_bytes(&mut suffix);
        format!(
            "{}-{}-{:06}-{}",
            usage.tag(),
            at.format("%Y%m%dT%H%M%SZ"),
            seq,
            hex::encode(suffix)
        )
    }
}

impl Default for KidGenerator {
    fn default() -> Self {
        Self::new()
    }
}
