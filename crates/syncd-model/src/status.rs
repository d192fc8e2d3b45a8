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

//! The externally-observable status of a submitted operation, derived from
//! tier membership.

use serde::{Deserialize, Serialize};

use crate::Tier;

/// Lifecycle status reported by the `status(operation_id)` query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Awaiting a worker in the `pending` tier.
    Pending,
    /// Currently owned by a worker in the `in_flight` tier.
    InFlight,
    /// Dispatched successfully; terminal.
    Completed,
    /// Terminated fatally outside the retry loop (e.g. a post-submit
    /// failure surfaced before any dispatch attempt).
    Failed,
    /// Exhausted its retry budget; terminal.
    DeadLetter,
}

impl From<Tier> for OperationStatus {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Pending => Self::Pending,
            Tier::InFlight => Self::InFlight,
            Tier::Completed => Self::Completed,
            Tier::Failed => Self::Failed,
            Tier::DeadLetter => Self::DeadLetter,
        }
    }
}
