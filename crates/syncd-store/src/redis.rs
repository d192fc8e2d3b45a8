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

//! Redis-backed [`BackingStore`]: an `operations` hash holds the canonical,
//! mutable record for every known operation id; each tier is a thin
//! collection of ids — a sorted set scored by priority for `pending`/
//! `in_flight`, an append-only list for `completed`/`failed`/`dead_letter`.
//!
//! Grounded on `infrastructure/src/redis/mod.rs::create_redis_connection`
//! for the connection-manager setup (retry backoff, response/connection
//! timeouts) and on the adapters' use of `redis::Script` for server-side
//! atomic scripting.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::ConnectionManager};
use syncd_core::UUID4;
use syncd_model::{Operation, Tier};

use crate::{
    backend::BackingStore,
    config::{DatabaseConfig, get_redis_url},
    error::{StoreError, StoreResult},
};

const OPERATIONS_KEY: &str = "operations";

/// Atomically pops the minimum-score member from `KEYS[1]` and re-inserts it
/// into `KEYS[2]` at the same score, returning the popped member (or `false`
/// if `KEYS[1]` was empty). Running both steps in one script closes the
/// pop/insert race a naive two-round-trip handoff would otherwise leave
/// open: a crash between the two round trips would lose the operation.
const POP_AND_MOVE_SCRIPT: &str = r"
local popped = redis.call('ZPOPMIN', KEYS[1], 1)
if #popped == 0 then
  return false
end
local member = popped[1]
local score = popped[2]
redis.call('ZADD', KEYS[2], score, member)
return member
";

/// Redis-backed [`BackingStore`] shared across every worker process.
#[derive(Clone)]
pub struct RedisBackingStore {
    conn: ConnectionManager,
    pop_and_move_script: Script,
}

impl std::fmt::Debug for RedisBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackingStore").finish_non_exhaustive()
    }
}

impl RedisBackingStore {
    /// Connects to Redis per `config`, wrapping the client in a connection
    /// manager that retries transparently on transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed or the initial
    /// connection fails.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let (url, redacted_url) = get_redis_url(config);
        tracing::debug!("connecting to {redacted_url}");

        let client = redis::Client::open(url)?;
        let manager_config = ConnectionManagerConfigShim::apply(config);
        let conn = client
            .get_connection_manager_with_config(manager_config)
            .await?;

        tracing::info!("connected to redis at {redacted_url}");
        Ok(Self {
            conn,
            pop_and_move_script: Script::new(POP_AND_MOVE_SCRIPT),
        })
    }

    async fn write_operation(&self, op: &Operation) -> StoreResult<()> {
        let payload = serde_json::to_string(op)?;
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(OPERATIONS_KEY, op.id.to_string(), payload)
            .await
            .map_err(StoreError::from)
    }

    async fn read_operation(&self, id: UUID4) -> StoreResult<Option<Operation>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.hget(OPERATIONS_KEY, id.to_string()).await?;
        Ok(match raw {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        })
    }
}

/// Thin indirection so the `ConnectionManagerConfig` builder call reads as a
/// single expression at the call site above.
struct ConnectionManagerConfigShim;

impl ConnectionManagerConfigShim {
    fn apply(config: &DatabaseConfig) -> redis::aio::ConnectionManagerConfig {
        redis::aio::ConnectionManagerConfig::new()
            .set_exponent_base(config.exponent_base)
            .set_factor(config.factor)
            .set_number_of_retries(config.number_of_retries)
            .set_response_timeout(Duration::from_secs(u64::from(config.response_timeout)))
            .set_connection_timeout(Duration::from_secs(u64::from(config.connection_timeout)))
            .set_max_delay(config.max_delay_ms)
    }
}

#[async_trait]
impl BackingStore for RedisBackingStore {
    async fn enqueue(&self, tier: Tier, op: &Operation) -> StoreResult<()> {
        self.write_operation(op).await?;
        let mut conn = self.conn.clone();
        let id = op.id.to_string();
        if tier.is_ordered_set() {
            conn.zadd::<_, _, _, ()>(tier.store_key(), id, f64::from(op.priority))
                .await?;
        } else {
            conn.rpush::<_, _, ()>(tier.store_key(), id).await?;
        }
        Ok(())
    }

    async fn pop_and_move(
        &self,
        from: Tier,
        to: Tier,
        timeout: Duration,
    ) -> StoreResult<Option<Operation>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let mut conn = self.conn.clone();
            let popped: Option<String> = self
                .pop_and_move_script
                .key(from.store_key())
                .key(to.store_key())
                .invoke_async(&mut conn)
                .await?;

            if let Some(member) = popped {
                let id: UUID4 = member
                    .parse()
                    .map_err(|_| StoreError::DanglingReference(UUID4::new()))?;
                return self.read_operation(id).await;
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    async fn remove(&self, tier: Tier, id: UUID4) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.zrem(tier.store_key(), id.to_string()).await?;
        Ok(removed > 0)
    }

    async fn append(&self, tier: Tier, op: &Operation) -> StoreResult<()> {
        self.write_operation(op).await?;
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(tier.store_key(), op.id.to_string())
            .await
            .map_err(StoreError::from)
    }

    async fn cardinality(&self, tier: Tier) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        let count = if tier.is_ordered_set() {
            conn.zcard(tier.store_key()).await?
        } else {
            conn.llen(tier.store_key()).await?
        };
        Ok(count)
    }

    async fn scan(&self, tier: Tier) -> StoreResult<Vec<Operation>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = if tier.is_ordered_set() {
            conn.zrange(tier.store_key(), 0, -1).await?
        } else {
            conn.lrange(tier.store_key(), 0, -1).await?
        };

        let mut operations = Vec::with_capacity(ids.len());
        for raw_id in ids {
            let Ok(id) = raw_id.parse::<UUID4>() else {
                continue;
            };
            if let Some(op) = self.read_operation(id).await? {
                operations.push(op);
            }
        }
        Ok(operations)
    }

    async fn get_operation(&self, id: UUID4) -> StoreResult<Option<Operation>> {
        self.read_operation(id).await
    }

    async fn incr_counter(&self, key: &str, n: i64, ttl: Duration) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, n).await?;
        // Only (re)set the TTL; a bare INCR would otherwise leave a stray
        // key with no expiry if this is the first touch of the hour bucket.
        conn.expire::<_, ()>(key, ttl.as_secs() as i64).await?;
        Ok(value)
    }

    async fn get_counter(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = conn.get(key).await?;
        Ok(value.unwrap_or(0))
    }
}
