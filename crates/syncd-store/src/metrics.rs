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

//! Hour-bucketed metrics counter keys: `metrics:<YYYY-MM-DD-HH>:<name>`,
//! with a 24-hour TTL set on first touch.

use std::time::Duration;

use chrono::{TimeZone, Utc};

/// TTL applied to every metrics counter on first touch.
pub const COUNTER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Formats the hour bucket for `now` (unix seconds) as `YYYY-MM-DD-HH`.
#[must_use]
pub fn hour_bucket(now: u64) -> String {
    let dt = Utc
        .timestamp_opt(i64::try_from(now).unwrap_or(i64::MAX), 0)
        .single()
        .unwrap_or_else(Utc::now);
    dt.format("%Y-%m-%d-%H").to_string()
}

/// Builds the full counter key `metrics:<hour>:<name>` for `now`.
#[must_use]
pub fn counter_key(now: u64, name: &str) -> String {
    format!("metrics:{}:{name}", hour_bucket(now))
}

/// Well-known counter names incremented by the scheduler.
pub mod counters {
    /// Incremented once per successful `submit`.
    pub const OPERATIONS_SUBMITTED: &str = "operations_submitted";
    /// Incremented once per operation routed to `completed`.
    pub const OPERATIONS_COMPLETED: &str = "operations_completed";
    /// Incremented once per operation routed to `dead_letter` after
    /// exhausting its retry budget.
    pub const OPERATIONS_FAILED: &str = "operations_failed";
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_hour_bucket_format() {
        // 2024-01-15T10:30:00Z
        let bucket = hour_bucket(1_705_314_600);
        assert_eq!(bucket, "2024-01-15-10");
    }

    #[rstest]
    fn test_counter_key() {
        let key = counter_key(1_705_314_600, counters::OPERATIONS_SUBMITTED);
        assert_eq!(key, "metrics:2024-01-15-10:operations_submitted");
    }
}
