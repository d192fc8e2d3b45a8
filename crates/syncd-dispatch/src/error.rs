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

//! The dispatch client's typed error taxonomy, mirroring the shape of the
//! teacher's per-exchange HTTP errors (`is_retryable`/`message` helpers).

use reqwest::StatusCode;
use syncd_transform::TransformError;

/// Failure modes of one dispatch attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The rate limiter rejected the request; the worker is responsible for
    /// re-enqueue and backoff. The client does not retry internally.
    #[error("rate limited")]
    RateLimited,

    /// Authentication failed after the single reactive re-auth-and-retry.
    #[error("authentication error: {0}")]
    AuthenticationError(String),

    /// The record failed to project onto the destination wire shape.
    #[error("transformation error: {0}")]
    TransformationError(#[from] TransformError),

    /// A `record_id` was required for this operation kind but absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The destination responded with a non-2xx status other than 401/429.
    #[error("api error: status {status}, body {body}")]
    ApiError {
        /// The HTTP status code returned.
        status: StatusCode,
        /// The response body, truncated for logging.
        body: String,
    },

    /// The provider named by the operation is not registered.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Connection, timeout, or other transport-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An unexpected failure outside the taxonomy above.
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl DispatchError {
    /// Whether this error is the terminal, synchronous submit-time
    /// rejection rather than a dispatch-time outcome.
    #[must_use]
    pub const fn is_unknown_provider(&self) -> bool {
        matches!(self, Self::UnknownProvider(_))
    }

    /// Whether this error should be treated as an authentication failure by
    /// the worker's outcome-routing switch.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }

    /// Whether this error should be treated as a rate-limit rejection by the
    /// worker's outcome-routing switch.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// A human-readable cause, recorded in `Operation::error_message` prior
    /// to terminal routing.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}
