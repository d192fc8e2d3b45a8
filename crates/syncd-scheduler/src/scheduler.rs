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

//! The scheduler: submission, the status query, provider (de)registration
//! and the live metrics surface. The worker pool itself lives in
//! [`crate::worker`]; this type is the shared state every worker task and
//! every caller of the ingress-facing operations holds a clone of.

use std::sync::Arc;

use syncd_dispatch::{DispatchClient, ProviderRegistry};
use syncd_model::{Operation, OperationStatus, ProviderConfig, Tier};
use syncd_network::{ProviderBudget, RateLimiterManager};
use syncd_store::{
    BackingStore,
    metrics::{counter_key, counters},
};

use crate::{
    error::SchedulerError,
    metrics::{ProviderMetrics, QueueMetrics},
};

/// Shared scheduler state: the backing store, provider registry, rate
/// limiter and dispatch client every worker task operates against.
pub struct Scheduler {
    pub(crate) store: Arc<dyn BackingStore>,
    pub(crate) registry: Arc<ProviderRegistry>,
    pub(crate) rate_limiter: Arc<RateLimiterManager>,
    pub(crate) dispatch: Arc<DispatchClient>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Wires together a backing store, provider registry, rate limiter and
    /// dispatch client into one scheduler.
    #[must_use]
    pub fn new(
        store: Arc<dyn BackingStore>,
        registry: Arc<ProviderRegistry>,
        rate_limiter: Arc<RateLimiterManager>,
        dispatch: Arc<DispatchClient>,
    ) -> Self {
        Self {
            store,
            registry,
            rate_limiter,
            dispatch,
        }
    }

    /// Registers (or replaces) a provider's configuration and rate budget.
    pub fn register_provider(&self, config: ProviderConfig) {
        let budget = ProviderBudget::per_minute(config.rate_per_minute, f64::from(config.burst));
        let name = config.name.clone();
        self.registry.register(config);
        self.rate_limiter.register(name, budget);
    }

    /// Deregisters a provider, reverting its rate limiter to fail-open.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::RateLimiter`] if the backend's
    /// bucket-forget call fails.
    pub async fn deregister_provider(&self, name: &str) -> Result<(), SchedulerError> {
        self.registry.deregister(name);
        self.rate_limiter.deregister(name).await?;
        Ok(())
    }

    /// Submits `op` to the `pending` tier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownProvider`] if `op.provider` is not
    /// registered, leaving the operation out of every tier and the
    /// `operations_submitted` counter untouched.
    pub async fn submit(&self, op: Operation, now: u64) -> Result<(), SchedulerError> {
        if !self.registry.contains(&op.provider) {
            tracing::warn!(provider = op.provider.as_str(), "rejecting submit for unknown provider");
            return Err(SchedulerError::UnknownProvider(op.provider.clone()));
        }

        self.store.enqueue(Tier::Pending, &op).await?;
        self.store
            .incr_counter(&counter_key(now, counters::OPERATIONS_SUBMITTED), 1, syncd_store::metrics::COUNTER_TTL)
            .await?;
        tracing::info!(id = %op.id, provider = op.provider.as_str(), priority = op.priority, "submitted operation");
        Ok(())
    }

    /// Scans all five tiers for `id`, returning its status and current
    /// record, or `None` if it has aged out of history.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if a tier scan fails.
    pub async fn status(&self, id: syncd_core::UUID4) -> Result<Option<(OperationStatus, Operation)>, SchedulerError> {
        for tier in Tier::ALL {
            let operations = self.store.scan(tier).await?;
            if let Some(op) = operations.into_iter().find(|op| op.id == id) {
                return Ok(Some((OperationStatus::from(tier), op)));
            }
        }
        Ok(None)
    }

    /// The live bucket status for `provider`, or `None` if unregistered.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::RateLimiter`] if the bucket read fails.
    pub async fn provider_status(
        &self,
        provider: &str,
        now: f64,
    ) -> Result<Option<syncd_network::BucketStatus>, SchedulerError> {
        Ok(self.rate_limiter.status(provider, now).await?)
    }

    /// Live queue-depth gauges, computed fresh on every call.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if a tier cardinality read fails.
    pub async fn queue_metrics(&self) -> Result<QueueMetrics, SchedulerError> {
        Ok(QueueMetrics {
            pending: self.store.cardinality(Tier::Pending).await?,
            in_flight: self.store.cardinality(Tier::InFlight).await?,
            dead_letter: self.store.cardinality(Tier::DeadLetter).await?,
        })
    }

    /// Hour-bucketed completed/failed counters and the derived error rate.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] if a counter read fails.
    pub async fn provider_metrics(&self, now: u64) -> Result<ProviderMetrics, SchedulerError> {
        let completed = self
            .store
            .get_counter(&counter_key(now, counters::OPERATIONS_COMPLETED))
            .await?;
        let failed = self
            .store
            .get_counter(&counter_key(now, counters::OPERATIONS_FAILED))
            .await?;
        Ok(ProviderMetrics::new(completed, failed))
    }
}
