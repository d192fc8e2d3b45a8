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

//! Errors surfaced by the scheduler's submission and query surface.

use syncd_store::StoreError;

/// Failure modes of `submit`, `status`, and the metrics/registration surface.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// `op.provider` named no registered provider at submit time.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The backing store failed to persist or read state.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The rate limiter's bucket backend failed outside the store contract
    /// (e.g. a Redis command error surfaced from `RateLimiterManager`).
    #[error("rate limiter error: {0}")]
    RateLimiter(#[from] anyhow::Error),
}
