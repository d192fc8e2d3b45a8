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

//! The worker pool: N independent `tokio::spawn` tasks draining `pending`,
//! each running an operation through dispatch to completion or dead-letter.

use std::{sync::Arc, time::Duration};

use syncd_model::{Operation, ProviderConfig, Tier};
use syncd_store::metrics::{counter_key, counters, COUNTER_TTL};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::scheduler::Scheduler;

/// How long a single blocking pop waits for a `pending` entry before a
/// worker re-checks the cancellation token.
const POP_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the current wallclock as unix seconds.
fn now_secs() -> u64 {
    syncd_core::time::get_atomic_clock_realtime().get_time() as u64
}

/// Spawns `n` worker tasks draining `scheduler`'s `pending` tier, returning
/// their join handles. Workers stop taking new work once `cancel` fires,
/// letting any in-flight dispatch finish first.
pub fn spawn_workers(scheduler: Arc<Scheduler>, n: usize, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
    (0..n)
        .map(|worker_id| {
            let scheduler = scheduler.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { worker_loop(scheduler, cancel, worker_id).await })
        })
        .collect()
}

async fn worker_loop(scheduler: Arc<Scheduler>, cancel: CancellationToken, worker_id: usize) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!(worker_id, "worker stopping on cancellation");
            return;
        }

        let popped = scheduler
            .store
            .pop_and_move(Tier::Pending, Tier::InFlight, POP_TIMEOUT)
            .await;

        let op = match popped {
            Ok(Some(op)) => op,
            Ok(None) => continue,
            Err(err) => {
                tracing::error!(worker_id, error = %err, "pop_and_move failed, retrying");
                continue;
            }
        };

        if let Err(err) = handle_one(&scheduler, op, worker_id).await {
            tracing::error!(worker_id, error = %err, "unexpected error handling operation");
        }
    }
}

/// Runs one popped operation through dispatch and routes the outcome to
/// `completed`, back to `pending` with backoff, or `dead_letter`.
async fn handle_one(
    scheduler: &Scheduler,
    mut op: Operation,
    worker_id: usize,
) -> Result<(), syncd_store::StoreError> {
    let now = now_secs();

    // A retry whose delay hasn't elapsed yet goes straight back to pending
    // rather than sleeping in place: a worker blocked sleeping on one
    // not-yet-due item can't pop any of the other pending entries, so with
    // more than one worker in the pool the rest keep draining while this
    // item's delay runs out.
    if !op.is_due_at(now) {
        scheduler.store.remove(Tier::InFlight, op.id).await?;
        scheduler.store.enqueue(Tier::Pending, &op).await?;
        return Ok(());
    }

    op.started_at = Some(now);
    tracing::debug!(worker_id, id = %op.id, provider = op.provider.as_str(), "dispatching operation");

    match scheduler.dispatch.dispatch(&op, now).await {
        Ok(outcome) => complete(scheduler, op, outcome, now).await,
        Err(err) => fail(scheduler, op, &err, now).await,
    }
}

async fn complete(
    scheduler: &Scheduler,
    mut op: Operation,
    outcome: syncd_model::DispatchOutcome,
    now: u64,
) -> Result<(), syncd_store::StoreError> {
    op.completed_at = Some(now);
    op.response_data = Some(outcome.body);
    if op.kind == syncd_model::OperationKind::Create {
        op.external_id = outcome.external_id;
    }

    scheduler.store.remove(Tier::InFlight, op.id).await?;
    scheduler.store.append(Tier::Completed, &op).await?;
    scheduler
        .store
        .incr_counter(&counter_key(now, counters::OPERATIONS_COMPLETED), 1, COUNTER_TTL)
        .await?;
    tracing::info!(id = %op.id, provider = op.provider.as_str(), "operation completed");
    Ok(())
}

async fn fail(
    scheduler: &Scheduler,
    mut op: Operation,
    err: &syncd_dispatch::DispatchError,
    now: u64,
) -> Result<(), syncd_store::StoreError> {
    op.error_message = Some(err.message());
    scheduler.store.remove(Tier::InFlight, op.id).await?;

    let max_retries = scheduler
        .registry
        .get(&op.provider)
        .map_or(ProviderConfig::DEFAULT_MAX_RETRIES, |c| c.max_retries);

    if op.retry_count < max_retries {
        op.retry_count += 1;
        let delay = 2_u64.saturating_pow(op.retry_count - 1).min(300);
        op.scheduled_at = Some(now + delay);
        tracing::warn!(
            id = %op.id,
            provider = op.provider.as_str(),
            retry_count = op.retry_count,
            delay,
            error = %err,
            "dispatch failed, re-enqueuing with backoff"
        );
        scheduler.store.enqueue(Tier::Pending, &op).await?;
    } else {
        tracing::error!(id = %op.id, provider = op.provider.as_str(), error = %err, "retry budget exhausted, dead-lettering");
        scheduler.store.append(Tier::DeadLetter, &op).await?;
        scheduler
            .store
            .incr_counter(&counter_key(now, counters::OPERATIONS_FAILED), 1, COUNTER_TTL)
            .await?;
    }

    Ok(())
}
