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

//! Errors produced while projecting a record through a [`crate::Mapping`] set.

use thiserror::Error;

/// Failure modes of [`crate::transform`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// A `required` mapping's source field was null or absent.
    #[error("missing required field `{0}`")]
    MissingField(String),
    /// A transformer either failed on a required field's value or the
    /// named transformer does not exist.
    #[error("transformation error on field `{field}`: {reason}")]
    TransformationError {
        /// The internal field name the failing mapping was keyed on.
        field: String,
        /// Human-readable cause, surfaced in `Operation::error_message`.
        reason: String,
    },
}

impl TransformError {
    /// Builds a [`TransformError::TransformationError`] for a lookup of a
    /// name that isn't registered, regardless of the mapping's `required`
    /// flag (per the schema transformer's unknown-name contract).
    #[must_use]
    pub fn unknown_transformer(field: &str, name: &str) -> Self {
        Self::TransformationError {
            field: field.to_string(),
            reason: format!("unknown transformer `{name}`"),
        }
    }
}
