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

//! Live queue-depth gauges and hour-bucketed error-rate metrics.

/// Live tier cardinalities, computed fresh on every call (never cached).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueMetrics {
    /// `ZCARD pending`.
    pub pending: u64,
    /// `ZCARD in_flight`.
    pub in_flight: u64,
    /// `LLEN dead_letter`.
    pub dead_letter: u64,
}

/// Hour-bucketed dispatch outcome counters and the derived error rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProviderMetrics {
    /// `operations_completed` for the current hour bucket.
    pub completed_hour: i64,
    /// `operations_failed` for the current hour bucket.
    pub failed_hour: i64,
    /// `failed_hour / (completed_hour + failed_hour)`, `0.0` when the
    /// denominator is `0`.
    pub error_rate: f64,
}

impl ProviderMetrics {
    /// Derives the error rate from the raw hour-bucket counters.
    #[must_use]
    pub fn new(completed_hour: i64, failed_hour: i64) -> Self {
        let denominator = completed_hour + failed_hour;
        let error_rate = if denominator == 0 {
            0.0
        } else {
            failed_hour as f64 / denominator as f64
        };
        Self {
            completed_hour,
            failed_hour,
            error_rate,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_error_rate_zero_when_no_activity() {
        let metrics = ProviderMetrics::new(0, 0);
        assert!((metrics.error_rate - 0.0).abs() < 1e-9);
    }

    #[rstest]
    fn test_error_rate_computed() {
        let metrics = ProviderMetrics::new(8, 2);
        assert!((metrics.error_rate - 0.2).abs() < 1e-9);
    }
}
