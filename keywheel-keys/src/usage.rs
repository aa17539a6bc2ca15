//! Usage type definitions
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
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a managed key is used for
///
/// Each usage maps to a fixed key length. The mapping is total over the
/// enum, so length resolution can never fail after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// AES-128 symmetric encryption
    Aes128,
    /// AES-256 symmetric encryption
    Aes256,
    /// HMAC-SHA256 message authentication
    Sha256Hmac,
    /// HMAC-SHA512 message authentication
    Sha512Hmac,
}

impl UsageType {
    /// Key length in bytes for this usage
    pub fn byte_len(&self) -> usize {
        match self {
            UsageType::Aes128 => 16,
            UsageType::Aes256 => 32,
            UsageType::Sha256Hmac => 32,
            UsageType::Sha512Hmac => 64,
        }
    }

    /// Stable lowercase tag, used in kids and storage names
    pub fn tag(&self) -> &'static str {
        match self {
            UsageType::Aes128 => "aes128",
            UsageType::Aes256 => "aes256",
            UsageType::Sha256Hmac => "sha256_hmac",
            UsageType::Sha512Hmac => "sha512_hmac",
        }
    }

    /// Default rotation period in days for this usage
    pub fn default_rotation_days(&self) -> u32 {
        match self {
            UsageType::Aes128 | UsageType::Aes256 => 30,
            UsageType::Sha256Hmac | UsageType::Sha512Hmac => 90,
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for UsageType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes128" => Ok(UsageType::Aes128),
            "aes256" => Ok(UsageType::Aes256),
            "sha256_hmac" => Ok(UsageType::Sha256Hmac),
            "sha512_hmac" => Ok(UsageType::Sha512Hmac),
            other => Err(KeyError::Configuration(format!(
                "unsupported usage type: {}",
                other
            ))),
        }
    }
}
