// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Errors produced by the backing-store abstraction.

use syncd_core::UUID4;

/// Errors produced by a [`crate::BackingStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying Redis connection or command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// An operation record failed to (de)serialize to/from its canonical
    /// byte string.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A tier scan or move referenced an operation id with no corresponding
    /// entry in the operation table; indicates the store is in an
    /// inconsistent state (e.g. a list entry survived a hash eviction).
    #[error("dangling operation id in tier: {0}")]
    DanglingReference(UUID4),
}

/// Convenience alias for results returned by a [`crate::BackingStore`].
pub type StoreResult<T> = Result<T, StoreError>;
