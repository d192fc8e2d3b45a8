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

//! Per-destination admission control: a registry of provider bucket
//! configurations fronting a shared [`BucketBackend`], with fail-open
//! behaviour for providers nobody has configured a budget for.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;

use crate::bucket::{BucketBackend, BucketStatus};

/// The static shape of one provider's token bucket: its peak burst
/// (`capacity`) and steady-state throughput (`refill_rate`, tokens/sec).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProviderBudget {
    /// Maximum tokens the bucket can hold (the burst ceiling).
    pub capacity: f64,
    /// Tokens restored per second.
    pub refill_rate: f64,
}

impl ProviderBudget {
    /// Builds a budget from a per-minute request rate and a burst multiple
    /// of that rate, the shape providers are usually quoted in (e.g.
    /// "100 requests/minute, bursts of up to 20").
    #[must_use]
    pub fn per_minute(requests_per_minute: f64, burst: f64) -> Self {
        Self {
            capacity: burst,
            refill_rate: requests_per_minute / 60.0,
        }
    }
}

/// How long bucket state is allowed to sit idle in the backend before it is
/// eligible to be dropped and re-materialized full.
const BUCKET_STATE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Registry of live provider budgets fronting a shared [`BucketBackend`].
///
/// Unregistered providers fail open (§4.2: "a provider with no configured
/// budget is never throttled") — `try_acquire` returns `true` immediately
/// rather than treating an unknown provider as zero-capacity.
#[derive(Debug)]
pub struct RateLimiterManager {
    backend: Arc<dyn BucketBackend>,
    budgets: DashMap<String, ProviderBudget>,
}

impl RateLimiterManager {
    /// Builds an empty manager over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn BucketBackend>) -> Self {
        Self {
            backend,
            budgets: DashMap::new(),
        }
    }

    /// Registers or replaces the budget for `provider`. Replacing a budget
    /// does not reset any tokens already accrued in the backend; the next
    /// refill simply uses the new rate and cap.
    pub fn register(&self, provider: impl Into<String>, budget: ProviderBudget) {
        self.budgets.insert(provider.into(), budget);
    }

    /// Removes `provider`'s budget, reverting it to fail-open. Backend state
    /// may persist until `BUCKET_STATE_TTL` elapses.
    pub async fn deregister(&self, provider: &str) -> anyhow::Result<()> {
        self.budgets.remove(provider);
        self.backend.forget(provider).await
    }

    /// Attempts to atomically deduct `n` tokens from `provider`'s bucket at
    /// `now` (unix seconds). Returns `true` immediately, without consuming
    /// any tokens, for a provider with no registered budget.
    pub async fn try_acquire(&self, provider: &str, n: f64, now: f64) -> anyhow::Result<bool> {
        let Some(budget) = self.budgets.get(provider).map(|b| *b) else {
            return Ok(true);
        };
        let outcome = self
            .backend
            .acquire(
                provider,
                budget.capacity,
                budget.refill_rate,
                n,
                now,
                BUCKET_STATE_TTL,
            )
            .await?;
        Ok(outcome.allowed)
    }

    /// Polls `try_acquire` until it succeeds or `timeout` elapses, sleeping
    /// between attempts for no longer than the time the bucket needs to
    /// accrue `n` tokens at its configured refill rate (capped at one second
    /// so a capacity change or deregistration is noticed promptly). Returns
    /// `true` on success, `false` if `timeout` elapses first.
    ///
    /// `now_fn` supplies the current unix-seconds clock on each poll; tests
    /// can feed it a fake clock to avoid real sleeps. `timeout` bounds real
    /// wall-clock time spent here, independent of `now_fn`.
    pub async fn await_capacity(
        &self,
        provider: &str,
        n: f64,
        timeout: Duration,
        mut now_fn: impl FnMut() -> f64 + Send,
    ) -> anyhow::Result<bool> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let now = now_fn();
            if self.try_acquire(provider, n, now).await? {
                return Ok(true);
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }

            let refill_rate = self
                .budgets
                .get(provider)
                .map_or(1.0, |b| b.refill_rate.max(f64::MIN_POSITIVE));
            // Clamp before building the `Duration`: `n / refill_rate` can
            // overflow to infinity for a near-zero rate, and
            // `Duration::from_secs_f64` panics on a non-finite input.
            let wait_secs = (n / refill_rate).clamp(0.0, 1.0);
            let wait = Duration::from_secs_f64(wait_secs)
                .min(deadline.saturating_duration_since(tokio::time::Instant::now()));
            tokio::time::sleep(wait).await;
        }
    }

    /// Returns the current bucket status for `provider`, or `None` if it has
    /// no registered budget.
    pub async fn status(&self, provider: &str, now: f64) -> anyhow::Result<Option<BucketStatus>> {
        let Some(budget) = self.budgets.get(provider).map(|b| *b) else {
            return Ok(None);
        };
        let tokens = self
            .backend
            .peek(provider, budget.capacity, budget.refill_rate, now)
            .await?;
        Ok(Some(BucketStatus::new(
            tokens,
            budget.capacity,
            budget.refill_rate,
        )))
    }
}
