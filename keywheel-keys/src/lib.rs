//! Key lifecycle management for Keywheel
//!
//! Generates, persists, and rotates symmetric key material (AEAD and HMAC
//! use) on a schedule, keeping superseded keys available for verification
//! during a grace period. Storage backends are pluggable behind the
//! [`KeyStore`] trait; a file backend ships here, remote KMS backends can
//! be added without touching the rotator.
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


pub mod error;
pub mod file_store;
pub mod kid;
pub mod material;
pub mod record;
pub mod rotator;
pub mod scheduler;
pub mod store;
pub mod usage;

pub use error::{KeyError, KeyResult};
pub use file_store::FileKeyStore;
pub use kid::KidGenerator;
pub use material::KeyMaterialFactory;
pub use record::{KeyRecord, SecretBytes};
pub use rotator::KeyRotator;
pub use scheduler::RotationScheduler;
pub use store::{KeyStore, MemoryKeyStore};
pub use usage::UsageType;
