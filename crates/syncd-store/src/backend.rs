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

//! The `BackingStore` contract: ordered-set, append-only list, and counter
//! primitives over the five tiers, plus the atomic pop-and-move handoff.
//!
//! Tier membership is tracked by operation id: the canonical, mutable
//! `Operation` record lives in a single table keyed by id, and each tier is
//! a thin collection of ids (a priority-scored set for `pending`/`in_flight`,
//! an append-only id list for `completed`/`failed`/`dead_letter`). `move`
//! between tiers is the sole transition primitive, so an id can never be
//! counted in two tiers at once.

use std::time::Duration;

use async_trait::async_trait;
use syncd_core::UUID4;
use syncd_model::{Operation, Tier};

use crate::error::StoreResult;

/// Abstraction over the ordered-set + list + counter primitives the
/// scheduler needs, satisfied by [`crate::memory::InMemoryBackingStore`] for
/// tests and [`crate::redis::RedisBackingStore`] for production use.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Writes `op` into the operation table and adds its id to `tier`
    /// (scored by `op.priority` for an ordered-set tier, appended for a
    /// list tier). Used by `submit` and by re-enqueue after a retry.
    async fn enqueue(&self, tier: Tier, op: &Operation) -> StoreResult<()>;

    /// Atomically pops the minimum-priority id from `from` and inserts it
    /// into `to` at the same priority, returning the popped operation.
    /// Blocks up to `timeout` for an entry to become available, polling the
    /// underlying store; returns `Ok(None)` on timeout with no entry found.
    ///
    /// The window between pop and insertion is closed by executing both
    /// halves as one atomic backing-store operation instead of two client
    /// round-trips, so a crash between them can't lose the operation.
    async fn pop_and_move(
        &self,
        from: Tier,
        to: Tier,
        timeout: Duration,
    ) -> StoreResult<Option<Operation>>;

    /// Removes `id` from the ordered-set tier `tier`, returning whether it
    /// was present. Used for the delayed-retry gate (pulling a future
    /// `scheduled_at` entry back out of `in_flight`) and before terminal
    /// routing.
    async fn remove(&self, tier: Tier, id: UUID4) -> StoreResult<bool>;

    /// Re-persists `op` (its mutated fields — `retry_count`, `scheduled_at`,
    /// `error_message`, etc.) and appends its id to the list tier `tier`.
    /// Used for the `completed`/`failed`/`dead_letter` terminal routes.
    async fn append(&self, tier: Tier, op: &Operation) -> StoreResult<()>;

    /// Number of ids currently held by `tier`.
    async fn cardinality(&self, tier: Tier) -> StoreResult<u64>;

    /// Returns every operation currently held by `tier`, in no particular
    /// order. Used by the status query and by queue-depth metrics.
    async fn scan(&self, tier: Tier) -> StoreResult<Vec<Operation>>;

    /// Looks up a single operation by id regardless of its tier, used by the
    /// status query once the holding tier is known.
    async fn get_operation(&self, id: UUID4) -> StoreResult<Option<Operation>>;

    /// Increments the counter at `key` by `n`, (re)setting its TTL to `ttl`
    /// on first touch, and returns the counter's new value.
    async fn incr_counter(&self, key: &str, n: i64, ttl: Duration) -> StoreResult<i64>;

    /// Reads the current value of the counter at `key`, or `0` if absent or
    /// expired.
    async fn get_counter(&self, key: &str) -> StoreResult<i64>;
}
