//! Error types for the key lifecycle manager
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


use thiserror::Error;

/// Key lifecycle errors
///
/// An unknown or aged-out kid is *not* represented here: `valid()` returns
/// `None` for that, since a miss on the verify path is an expected outcome.
#[derive(Error, Debug)]
pub enum KeyError {
    /// Invalid usage tag, backend tag, or rotation parameters. Fatal at
    /// construction; a rotator is never handed out half-built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Storage backend failure (I/O, corrupt record, timeout). Distinct
    /// from "record not found", which `KeyStore::load` reports as `Ok(None)`.
    #[error("storage error: {0}")]
    Storage(String),

    /// Another rotation is already in flight. Retry on the next tick.
    #[error("a key rotation is already in progress")]
    RotationInProgress,
}

impl From<std::io::Error> for KeyError {
    fn from(e: std::io::Error) -> Self {
        KeyError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for KeyError {
    fn from(e: serde_json::Error) -> Self {
        KeyError::Storage(format!("record serialization failed: {}", e))
    }
}

/// Result type for key operations
pub type KeyResult<T> = Result<T, KeyError>;
