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

//! Exponential backoff for the dispatch client's transport-level retry
//! envelope (connection/timeout errors only — rate-limit and status-code
//! handling live one layer up in `syncd-dispatch`).

use std::time::Duration;

use rand::Rng;

/// Minimum allowed growth factor.
pub const MIN_FACTOR: f64 = 1.0;
/// Maximum allowed growth factor.
pub const MAX_FACTOR: f64 = 100.0;

/// Error returned by [`ExponentialBackoff::new`] for an out-of-range factor.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[error("backoff factor {0} must be in [{MIN_FACTOR}, {MAX_FACTOR}]")]
pub struct InvalidFactor(pub f64);

/// Tracks the current base delay of an exponential backoff sequence,
/// growing by `factor` on each call up to `max`, with up to `jitter_ms` of
/// uniform random jitter added to each returned duration.
#[derive(Debug)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    jitter_ms: u64,
    immediate_first: bool,
    current: Duration,
    first_call_pending: bool,
}

impl ExponentialBackoff {
    /// Builds a new backoff sequence starting at `initial`, capped at `max`,
    /// growing by `factor` each call.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFactor`] if `factor` is outside `[1.0, 100.0]`.
    pub fn new(
        initial: Duration,
        max: Duration,
        factor: f64,
        jitter_ms: u64,
        immediate_first: bool,
    ) -> Result<Self, InvalidFactor> {
        if !(MIN_FACTOR..=MAX_FACTOR).contains(&factor) {
            return Err(InvalidFactor(factor));
        }
        Ok(Self {
            initial,
            max,
            factor,
            jitter_ms,
            immediate_first,
            current: initial,
            first_call_pending: immediate_first,
        })
    }

    /// The current base delay (before jitter), capped at `max`.
    #[must_use]
    pub const fn current_delay(&self) -> Duration {
        self.current
    }

    /// Returns the next delay to wait and advances the sequence.
    ///
    /// With `immediate_first` set, the very first call (or the first call
    /// after [`Self::reset`]) returns [`Duration::ZERO`] without growing the
    /// sequence.
    pub fn next_duration(&mut self) -> Duration {
        if self.first_call_pending {
            self.first_call_pending = false;
            return Duration::ZERO;
        }

        let base = self.current;
        let jitter = if self.jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=self.jitter_ms))
        };

        let grown_nanos = (base.as_nanos() as f64 * self.factor) as u128;
        let grown = Duration::from_nanos(u64::try_from(grown_nanos).unwrap_or(u64::MAX));
        self.current = grown.min(self.max).max(self.initial);

        base + jitter
    }

    /// Restores the sequence to its initial state, including the
    /// `immediate_first` behavior.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.first_call_pending = self.immediate_first;
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
    fn test_grows_up_to_max() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10), 2.0, 0, false)
                .unwrap();
        assert_eq!(backoff.next_duration(), Duration::from_secs(1));
        assert_eq!(backoff.next_duration(), Duration::from_secs(2));
        assert_eq!(backoff.next_duration(), Duration::from_secs(4));
        assert_eq!(backoff.next_duration(), Duration::from_secs(8));
        assert_eq!(backoff.next_duration(), Duration::from_secs(10));
        assert_eq!(backoff.next_duration(), Duration::from_secs(10));
    }

    #[rstest]
    fn test_immediate_first() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10), 2.0, 0, true)
                .unwrap();
        assert_eq!(backoff.next_duration(), Duration::ZERO);
        assert_eq!(backoff.next_duration(), Duration::from_secs(1));
    }

    #[rstest]
    fn test_reset_restores_immediate_first() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10), 2.0, 0, true)
                .unwrap();
        backoff.next_duration();
        backoff.next_duration();
        backoff.reset();
        assert_eq!(backoff.current_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_duration(), Duration::ZERO);
    }

    #[rstest]
    #[case(0.5)]
    #[case(100.1)]
    fn test_invalid_factor_rejected(#[case] factor: f64) {
        let result =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10), factor, 0, false);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_dispatch_default_envelope() {
        // base 1s, min 4s (reached after one growth at factor 4), max 10s,
        // matching the dispatch client's transport-level retry envelope.
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10), 4.0, 0, false)
                .unwrap();
        assert_eq!(backoff.next_duration(), Duration::from_secs(1));
        assert_eq!(backoff.next_duration(), Duration::from_secs(4));
        assert_eq!(backoff.next_duration(), Duration::from_secs(10));
    }
}
