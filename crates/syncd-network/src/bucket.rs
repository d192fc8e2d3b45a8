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

//! The per-provider token bucket: atomic refill-and-consume against a
//! [`BucketBackend`], per §4.1.
//!
//! The refill arithmetic is backend-agnostic (`tokens = min(capacity, tokens
//! + elapsed * refill_rate)`); what differs between backends is *where* that
//! arithmetic runs atomically. [`RedisBucketBackend`] runs it server-side as
//! a Lua script so the bucket is safely shared across worker processes;
//! [`InMemoryBucketBackend`] runs it under a local mutex for tests that
//! don't need a live Redis.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::ConnectionManager};

/// The result of one `acquire` attempt against a [`BucketBackend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketOutcome {
    /// Whether `n` tokens were successfully deducted.
    pub allowed: bool,
    /// The token count remaining after this call (post-deduction if
    /// `allowed`, post-refill-only otherwise).
    pub tokens: f64,
}

/// Backend performing the atomic refill-and-consume (or refill-only peek)
/// for one provider's bucket state.
#[async_trait]
pub trait BucketBackend: Send + Sync {
    /// Atomically refills and attempts to deduct `n` tokens for `provider`,
    /// per the §4.1 algorithm. `now` is unix seconds; `ttl` bounds how long
    /// idle bucket state survives before being re-materialized full.
    async fn acquire(
        &self,
        provider: &str,
        capacity: f64,
        refill_rate: f64,
        n: f64,
        now: f64,
        ttl: Duration,
    ) -> anyhow::Result<BucketOutcome>;

    /// Returns the token count after refill, without consuming any tokens —
    /// backs the `status` inspection query.
    async fn peek(
        &self,
        provider: &str,
        capacity: f64,
        refill_rate: f64,
        now: f64,
    ) -> anyhow::Result<f64>;

    /// Drops any persisted state for `provider`. Backing-store state may
    /// linger past this call until its TTL expires (§4.2's `deregister`
    /// contract); this only clears what the backend can clear immediately.
    async fn forget(&self, provider: &str) -> anyhow::Result<()>;
}

fn refill(tokens: f64, last_refill: f64, capacity: f64, refill_rate: f64, now: f64) -> f64 {
    let elapsed = (now - last_refill).max(0.0);
    (tokens + elapsed * refill_rate).min(capacity)
}

/// Redis-backed [`BucketBackend`], sharing bucket state across every worker
/// process via a `rate_limit:<provider>` hash, refilled and consumed by a
/// single atomic Lua script.
#[derive(Clone)]
pub struct RedisBucketBackend {
    conn: ConnectionManager,
    script: Script,
}

const ACQUIRE_SCRIPT: &str = r"
local key = KEYS[1]
local capacity = tonumber(ARGV[1])
local refill_rate = tonumber(ARGV[2])
local n = tonumber(ARGV[3])
local now = tonumber(ARGV[4])
local ttl = tonumber(ARGV[5])

local tokens = capacity
local last_refill = now
local state = redis.call('HMGET', key, 'tokens', 'last_refill')
if state[1] then
  tokens = tonumber(state[1])
  last_refill = tonumber(state[2])
end

local elapsed = now - last_refill
if elapsed < 0 then elapsed = 0 end
local refilled = tokens + elapsed * refill_rate
if refilled > capacity then refilled = capacity end

local allowed = 0
local remaining = refilled
if refilled >= n then
  allowed = 1
  remaining = refilled - n
end

redis.call('HMSET', key, 'tokens', remaining, 'last_refill', now)
redis.call('EXPIRE', key, ttl)
return {allowed, tostring(remaining)}
";

impl std::fmt::Debug for RedisBucketBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBucketBackend").finish_non_exhaustive()
    }
}

impl RedisBucketBackend {
    /// Wraps an existing Redis connection manager.
    #[must_use]
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            script: Script::new(ACQUIRE_SCRIPT),
        }
    }

    fn key(provider: &str) -> String {
        format!("rate_limit:{provider}")
    }
}

#[async_trait]
impl BucketBackend for RedisBucketBackend {
    async fn acquire(
        &self,
        provider: &str,
        capacity: f64,
        refill_rate: f64,
        n: f64,
        now: f64,
        ttl: Duration,
    ) -> anyhow::Result<BucketOutcome> {
        let mut conn = self.conn.clone();
        let (allowed, remaining): (i64, String) = self
            .script
            .key(Self::key(provider))
            .arg(capacity)
            .arg(refill_rate)
            .arg(n)
            .arg(now)
            .arg(ttl.as_secs())
            .invoke_async(&mut conn)
            .await?;
        Ok(BucketOutcome {
            allowed: allowed == 1,
            tokens: remaining.parse().unwrap_or(0.0),
        })
    }

    async fn peek(
        &self,
        provider: &str,
        capacity: f64,
        refill_rate: f64,
        now: f64,
    ) -> anyhow::Result<f64> {
        let mut conn = self.conn.clone();
        let state: Option<(f64, f64)> = {
            let tokens: Option<f64> = conn.hget(Self::key(provider), "tokens").await?;
            let last_refill: Option<f64> = conn.hget(Self::key(provider), "last_refill").await?;
            tokens.zip(last_refill)
        };
        Ok(match state {
            Some((tokens, last_refill)) => refill(tokens, last_refill, capacity, refill_rate, now),
            None => capacity,
        })
    }

    async fn forget(&self, provider: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(provider)).await?;
        Ok(())
    }
}

/// In-memory [`BucketBackend`] for tests, implementing the identical refill
/// algorithm under a process-local mutex.
#[derive(Debug, Default)]
pub struct InMemoryBucketBackend {
    state: Mutex<HashMap<String, (f64, f64)>>,
}

impl InMemoryBucketBackend {
    /// Builds an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BucketBackend for InMemoryBucketBackend {
    async fn acquire(
        &self,
        provider: &str,
        capacity: f64,
        refill_rate: f64,
        n: f64,
        now: f64,
        _ttl: Duration,
    ) -> anyhow::Result<BucketOutcome> {
        let mut state = self.state.lock().unwrap();
        let (tokens, last_refill) = state.get(provider).copied().unwrap_or((capacity, now));
        let refilled = refill(tokens, last_refill, capacity, refill_rate, now);

        let (allowed, remaining) = if refilled >= n {
            (true, refilled - n)
        } else {
            (false, refilled)
        };
        state.insert(provider.to_string(), (remaining, now));
        Ok(BucketOutcome {
            allowed,
            tokens: remaining,
        })
    }

    async fn peek(
        &self,
        provider: &str,
        capacity: f64,
        refill_rate: f64,
        now: f64,
    ) -> anyhow::Result<f64> {
        let state = self.state.lock().unwrap();
        Ok(match state.get(provider).copied() {
            Some((tokens, last_refill)) => refill(tokens, last_refill, capacity, refill_rate, now),
            None => capacity,
        })
    }

    async fn forget(&self, provider: &str) -> anyhow::Result<()> {
        self.state.lock().unwrap().remove(provider);
        Ok(())
    }
}

/// Status snapshot returned by [`crate::ratelimiter::RateLimiterManager::status`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketStatus {
    /// Tokens available after refill (no consumption).
    pub tokens: f64,
    /// Bucket capacity (peak burst).
    pub capacity: f64,
    /// Tokens/sec refill rate.
    pub refill_rate: f64,
    /// `1 - tokens / capacity`.
    pub utilization: f64,
}

impl BucketStatus {
    /// Builds a status snapshot from the refilled token count.
    #[must_use]
    pub fn new(tokens: f64, capacity: f64, refill_rate: f64) -> Self {
        let utilization = if capacity > 0.0 {
            1.0 - tokens / capacity
        } else {
            0.0
        };
        Self {
            tokens,
            capacity,
            refill_rate,
            utilization,
        }
    }
}
