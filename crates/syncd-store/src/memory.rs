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

//! An in-memory [`BackingStore`] fake, so unit and property tests exercise
//! the scheduler and rate limiter without a live Redis, mirroring the
//! teacher's `#[ignore]`d-real-service convention
//! (`infrastructure/tests/test_cache_redis.rs`): real Redis is only
//! exercised by an explicitly `#[ignore]`d integration suite.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use syncd_core::UUID4;
use syncd_model::{Operation, Tier};

use crate::{backend::BackingStore, error::StoreResult};

#[derive(Default)]
struct State {
    operations: HashMap<UUID4, Operation>,
    /// Ordered-set tiers: `(priority, insertion_seq, id)`, scanned/popped by
    /// `(priority, insertion_seq)` so ties break FIFO (spec permits any
    /// tie-break; FIFO is simply deterministic and convenient for tests).
    ordered: HashMap<Tier, Vec<(u8, u64, UUID4)>>,
    /// List tiers, in append order.
    lists: HashMap<Tier, Vec<UUID4>>,
    counters: HashMap<String, (i64, Instant, Duration)>,
    seq: u64,
}

impl State {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn insert(&mut self, tier: Tier, id: UUID4, priority: u8, seq: u64) {
        if tier.is_ordered_set() {
            self.ordered.entry(tier).or_default().push((priority, seq, id));
        } else {
            self.lists.entry(tier).or_default().push(id);
        }
    }

    fn pop_min(&mut self, tier: Tier) -> Option<UUID4> {
        let entries = self.ordered.entry(tier).or_default();
        let min_idx = entries
            .iter()
            .enumerate()
            .min_by_key(|(_, (priority, seq, _))| (*priority, *seq))
            .map(|(idx, _)| idx)?;
        Some(entries.remove(min_idx).2)
    }
}

/// In-memory [`BackingStore`] backed by a single [`Mutex`]. Not shared across
/// processes; intended for tests only.
#[derive(Default)]
pub struct InMemoryBackingStore {
    state: Mutex<State>,
}

impl InMemoryBackingStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for InMemoryBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackingStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl BackingStore for InMemoryBackingStore {
    async fn enqueue(&self, tier: Tier, op: &Operation) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        let seq = state.next_seq();
        state.operations.insert(op.id, op.clone());
        state.insert(tier, op.id, op.priority, seq);
        Ok(())
    }

    async fn pop_and_move(
        &self,
        from: Tier,
        to: Tier,
        timeout: Duration,
    ) -> StoreResult<Option<Operation>> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut state = self.state.lock().unwrap();
                if let Some(id) = state.pop_min(from) {
                    let seq = state.next_seq();
                    let priority = state
                        .operations
                        .get(&id)
                        .map(|op| op.priority)
                        .unwrap_or(10);
                    state.insert(to, id, priority, seq);
                    return Ok(state.operations.get(&id).cloned());
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn remove(&self, tier: Tier, id: UUID4) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let entries = state.ordered.entry(tier).or_default();
        let before = entries.len();
        entries.retain(|(_, _, entry_id)| *entry_id != id);
        Ok(entries.len() != before)
    }

    async fn append(&self, tier: Tier, op: &Operation) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.operations.insert(op.id, op.clone());
        state.lists.entry(tier).or_default().push(op.id);
        Ok(())
    }

    async fn cardinality(&self, tier: Tier) -> StoreResult<u64> {
        let state = self.state.lock().unwrap();
        let count = if tier.is_ordered_set() {
            state.ordered.get(&tier).map_or(0, Vec::len)
        } else {
            state.lists.get(&tier).map_or(0, Vec::len)
        };
        Ok(count as u64)
    }

    async fn scan(&self, tier: Tier) -> StoreResult<Vec<Operation>> {
        let state = self.state.lock().unwrap();
        let ids: Vec<UUID4> = if tier.is_ordered_set() {
            state
                .ordered
                .get(&tier)
                .map(|entries| entries.iter().map(|(_, _, id)| *id).collect())
                .unwrap_or_default()
        } else {
            state.lists.get(&tier).cloned().unwrap_or_default()
        };
        Ok(ids
            .into_iter()
            .filter_map(|id| state.operations.get(&id).cloned())
            .collect())
    }

    async fn get_operation(&self, id: UUID4) -> StoreResult<Option<Operation>> {
        let state = self.state.lock().unwrap();
        Ok(state.operations.get(&id).cloned())
    }

    async fn incr_counter(&self, key: &str, n: i64, ttl: Duration) -> StoreResult<i64> {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        let entry = state.counters.entry(key.to_string());
        let value = match entry {
            std::collections::hash_map::Entry::Occupied(mut occ) => {
                let (value, expires_at, _) = occ.get_mut();
                if *expires_at <= now {
                    *value = n;
                } else {
                    *value += n;
                }
                *expires_at = now + ttl;
                *value
            }
            std::collections::hash_map::Entry::Vacant(vac) => {
                vac.insert((n, now + ttl, ttl));
                n
            }
        };
        Ok(value)
    }

    async fn get_counter(&self, key: &str) -> StoreResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .counters
            .get(key)
            .filter(|(_, expires_at, _)| *expires_at > Instant::now())
            .map_or(0, |(value, _, _)| *value))
    }
}
