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

//! Provider configuration: the wire-protocol dialect, rate budget and auth
//! descriptor for one registered destination.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Auth;

/// The wire-protocol dialect of a registered provider, selecting URL shapes
/// and update verbs in the dispatch client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderKind {
    /// Salesforce REST API (`/services/data/v52.0/...`).
    Salesforce,
    /// HubSpot CRM API (`/crm/v3/...`).
    Hubspot,
    /// Pipedrive API (`/v1/...`).
    Pipedrive,
    /// A generic provider using plain `/contacts` endpoints.
    Custom,
}

/// Configuration for one registered destination provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name used as the `Operation::provider` and the rate
    /// limiter registration key.
    pub name: String,
    /// Wire-protocol dialect.
    pub kind: ProviderKind,
    /// Base URL the dispatch client joins with the per-kind path.
    pub base_endpoint: String,
    /// Sustained request budget, in requests per minute.
    pub rate_per_minute: f64,
    /// Peak burst capacity (token bucket capacity).
    pub burst: u32,
    /// Per-request timeout applied by the HTTP transport.
    pub timeout: Duration,
    /// Maximum dispatch attempts before an operation is dead-lettered.
    pub max_retries: u32,
    /// Authentication descriptor.
    pub auth: Auth,
}

impl ProviderConfig {
    /// Default per-request timeout applied when a config doesn't specify one.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default retry cap used when a provider is deregistered mid-flight
    /// and the worker loop can no longer look up its configured limit.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Token refill rate in tokens/sec, derived from `rate_per_minute`.
    #[must_use]
    pub fn refill_rate(&self) -> f64 {
        self.rate_per_minute / 60.0
    }
}
