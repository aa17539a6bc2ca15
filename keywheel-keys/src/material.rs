//! Random key material generation
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
use rand::rngs::OsRng;
use rand::RngCore;

/// Produces cryptographically secure random key material for one usage.
///
/// The byte length is resolved once at construction. `UsageType::byte_len`
/// is total, so generation itself has no failure path.
#[derive(Debug, Clone, Copy)]
pub struct KeyMaterialFactory {
    usage: UsageType,
    byte_len: usize,
}

impl KeyMaterialFactory {
    pub fn new(usage: UsageType) -> Self {
        Self {
            usage,
            byte_len: usage.byte_len(),
        }
    }

    pub fn usage(&self) -> UsageType {
        self.usage
    }

    /// Generate fresh key material from the OS entropy source
    pub fn generate(&self) -> Vec<u8> {
        let mut material = vec![0u8; self.byte_len];
        OsRng.fill_bytes(&mut material);
        material
    }
}
