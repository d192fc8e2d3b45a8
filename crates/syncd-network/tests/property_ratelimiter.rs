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

//! Property-based tests for the per-destination token bucket.
//!
//! These verify the envelope invariant the admission controller promises:
//! over any time window, the number of successful acquisitions is bounded
//! by the burst capacity plus whatever the refill rate accrues over that
//! window — never more, and never negative tokens.

use std::sync::Arc;

use proptest::prelude::*;
use syncd_network::{
    bucket::InMemoryBucketBackend,
    ratelimiter::{ProviderBudget, RateLimiterManager},
};

fn run_window(capacity: f64, refill_rate: f64, attempts: usize, step_secs: f64) -> usize {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async move {
            let manager = RateLimiterManager::new(Arc::new(InMemoryBucketBackend::new()));
            manager.register("provider", ProviderBudget { capacity, refill_rate });

            let mut allowed = 0usize;
            let mut now = 0.0_f64;
            for _ in 0..attempts {
                if manager.try_acquire("provider", 1.0, now).await.unwrap() {
                    allowed += 1;
                }
                now += step_secs;
            }
            allowed
        })
}

proptest! {
    /// Property: over a burst of back-to-back attempts at `t=0`, no more
    /// than `capacity` single-token acquisitions ever succeed.
    #[test]
    fn burst_never_exceeds_capacity(
        capacity in 1.0..50.0_f64,
        refill_rate in 0.0..10.0_f64,
        attempts in 1usize..200,
    ) {
        let allowed = run_window(capacity, refill_rate, attempts, 0.0);
        prop_assert!(allowed as f64 <= capacity.floor() + 1.0);
    }

    /// Property: spaced one full refill-interval apart, every attempt
    /// succeeds — the bucket never under-refills relative to elapsed time.
    #[test]
    fn spaced_attempts_within_rate_always_succeed(
        refill_rate in 0.1..20.0_f64,
        attempts in 1usize..50,
    ) {
        let capacity = refill_rate.max(1.0);
        let step = 1.0 / refill_rate;
        let allowed = run_window(capacity, refill_rate, attempts, step);
        prop_assert_eq!(allowed, attempts);
    }

    /// Property: the total tokens consumable over a window of `attempts`
    /// one-second-spaced acquisitions never exceeds capacity plus what the
    /// window's elapsed time can refill.
    #[test]
    fn window_envelope_is_respected(
        capacity in 1.0..20.0_f64,
        refill_rate in 0.0..5.0_f64,
        attempts in 1usize..100,
    ) {
        let allowed = run_window(capacity, refill_rate, attempts, 1.0);
        let elapsed = (attempts.saturating_sub(1)) as f64;
        let envelope = capacity + elapsed * refill_rate;
        prop_assert!(allowed as f64 <= envelope.floor() + 1.0);
    }
}

#[tokio::test]
async fn test_unregistered_provider_never_throttled() {
    let manager = RateLimiterManager::new(Arc::new(InMemoryBucketBackend::new()));
    for _ in 0..1000 {
        assert!(manager.try_acquire("unbudgeted", 1.0, 0.0).await.unwrap());
    }
}

#[tokio::test]
async fn test_tokens_never_go_negative_under_contention() {
    let manager = RateLimiterManager::new(Arc::new(InMemoryBucketBackend::new()));
    manager.register("provider", ProviderBudget { capacity: 5.0, refill_rate: 0.0 });

    for _ in 0..20 {
        manager.try_acquire("provider", 1.0, 0.0).await.unwrap();
    }
    let status = manager.status("provider", 0.0).await.unwrap().unwrap();
    assert!(status.tokens >= 0.0);
}
