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

//! A durable, priority-ordered job processor that drains sync operations
//! from a shared backing store and dispatches them to third-party HTTP
//! endpoints under per-destination rate-limit budgets.
//!
//! This crate re-exports the public surface of the workspace's member
//! crates and wires them together behind [`SyncDispatcher`], the single
//! entry point an embedding service needs: submit an operation, query its
//! status, (de)register a provider, read live metrics, and start the
//! worker pool that drains the queue.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use syncd_core::{UUID4, UnixNanos};
pub use syncd_dispatch::{DispatchClient, DispatchError, ProviderRegistry};
pub use syncd_model::{
    Auth, CachedToken, Direction, DispatchOutcome, FieldValue, Mapping, Operation, OperationError,
    OperationKind, OperationStatus, ProviderConfig, ProviderKind, Tier, default_mappings,
};
pub use syncd_network::{
    BucketBackend, BucketOutcome, BucketStatus, ExponentialBackoff, InMemoryBucketBackend,
    ProviderBudget, RateLimiterManager, RedisBucketBackend,
};
pub use syncd_scheduler::{ProviderMetrics, QueueMetrics, Scheduler, SchedulerError, spawn_workers};
pub use syncd_store::{BackingStore, DatabaseConfig, InMemoryBackingStore, RedisBackingStore, StoreError};
pub use syncd_transform::{TransformError, TransformerRegistry, transform};

/// Wires a backing store and a token-bucket backend into a running
/// [`Scheduler`] plus its [`DispatchClient`], [`ProviderRegistry`] and
/// [`RateLimiterManager`] — the assembly every embedding service otherwise
/// has to repeat by hand.
#[derive(Clone)]
pub struct SyncDispatcher {
    scheduler: Arc<Scheduler>,
}

impl std::fmt::Debug for SyncDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncDispatcher").finish_non_exhaustive()
    }
}

impl SyncDispatcher {
    /// Builds a dispatcher over `store` (durable tier/counter state) and
    /// `bucket_backend` (token-bucket state, typically the same backing
    /// store wrapped as a [`BucketBackend`]).
    #[must_use]
    pub fn new(store: Arc<dyn BackingStore>, bucket_backend: Arc<dyn BucketBackend>) -> Self {
        let registry = Arc::new(ProviderRegistry::new());
        let rate_limiter = Arc::new(RateLimiterManager::new(bucket_backend));
        let dispatch = Arc::new(DispatchClient::new(registry.clone(), rate_limiter.clone()));
        let scheduler = Arc::new(Scheduler::new(store, registry, rate_limiter, dispatch));
        Self { scheduler }
    }

    /// Registers or replaces a provider's configuration and rate budget.
    pub fn register_provider(&self, config: ProviderConfig) {
        self.scheduler.register_provider(config);
    }

    /// Deregisters a provider, reverting its rate limiter to fail-open.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] if the bucket backend's forget call fails.
    pub async fn deregister_provider(&self, name: &str) -> Result<(), SchedulerError> {
        self.scheduler.deregister_provider(name).await
    }

    /// Submits `op` to the `pending` tier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownProvider`] if `op.provider` is not
    /// registered.
    pub async fn submit(&self, op: Operation, now: u64) -> Result<(), SchedulerError> {
        self.scheduler.submit(op, now).await
    }

    /// Looks up an operation's current lifecycle status and record.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if a tier scan fails.
    pub async fn status(&self, id: UUID4) -> Result<Option<(OperationStatus, Operation)>, SchedulerError> {
        self.scheduler.status(id).await
    }

    /// The live token-bucket status for `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::RateLimiter`] if the bucket read fails.
    pub async fn provider_status(&self, provider: &str, now: f64) -> Result<Option<BucketStatus>, SchedulerError> {
        self.scheduler.provider_status(provider, now).await
    }

    /// Live queue-depth gauges (`pending`, `in_flight`, `dead_letter`).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if a tier cardinality read fails.
    pub async fn queue_metrics(&self) -> Result<QueueMetrics, SchedulerError> {
        self.scheduler.queue_metrics().await
    }

    /// Hour-bucketed completed/failed counters and the derived error rate.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if a counter read fails.
    pub async fn provider_metrics(&self, now: u64) -> Result<ProviderMetrics, SchedulerError> {
        self.scheduler.provider_metrics(now).await
    }

    /// Starts `n` worker tasks draining `pending` until `cancel` fires.
    pub fn spawn_workers(&self, n: usize, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        spawn_workers(self.scheduler.clone(), n, cancel)
    }
}
