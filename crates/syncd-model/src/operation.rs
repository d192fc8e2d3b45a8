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

//! A CRUD intent against a registered provider: the unit of work that
//! moves through the five tiers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use syncd_core::{UUID4, correctness::check_in_range_inclusive_u8};

use crate::FieldValue;

/// The CRUD intent carried by an [`Operation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    /// Create a new record.
    Create,
    /// Read an existing record by id.
    Read,
    /// Update an existing record by id.
    Update,
    /// Delete an existing record by id.
    Delete,
}

impl OperationKind {
    /// `true` for kinds that carry a field payload (`CREATE`/`UPDATE`).
    #[must_use]
    pub const fn requires_record(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }

    /// `true` for kinds that carry an external record id
    /// (`READ`/`UPDATE`/`DELETE`).
    #[must_use]
    pub const fn requires_record_id(self) -> bool {
        matches!(self, Self::Read | Self::Update | Self::Delete)
    }
}

/// A durable CRUD intent against a registered provider.
///
/// Immutable once enqueued, except for `retry_count`, `scheduled_at`,
/// `started_at`, `completed_at`, `external_id`, `error_message` and
/// `response_data`, which the worker loop mutates as the operation moves
/// through its lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier assigned at submission.
    pub id: UUID4,
    /// The CRUD intent.
    pub kind: OperationKind,
    /// Name of a registered provider; must exist at submit time.
    pub provider: String,
    /// External record identifier; required for READ/UPDATE/DELETE.
    pub record_id: Option<String>,
    /// Field payload; required for CREATE/UPDATE.
    pub record: Option<HashMap<String, FieldValue>>,
    /// Priority in `[1, 10]`; lower is sooner.
    pub priority: u8,
    /// Submission wallclock, unix seconds.
    pub created_at: u64,
    /// Earliest-dispatch wallclock, unix seconds; used for delayed retry.
    pub scheduled_at: Option<u64>,
    /// Dispatch attempts so far.
    pub retry_count: u32,
    /// Wallclock the most recent dispatch attempt began.
    pub started_at: Option<u64>,
    /// Wallclock the operation reached a terminal state.
    pub completed_at: Option<u64>,
    /// For CREATE, the id assigned by the destination, if present in the
    /// response.
    pub external_id: Option<String>,
    /// Populated prior to terminal routing on failure.
    pub error_message: Option<String>,
    /// Raw response body captured on a successful dispatch.
    pub response_data: Option<serde_json::Value>,
}

/// Error produced while constructing an [`Operation`] whose fields violate
/// the invariants [`Operation::new`] enforces.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// `priority` was outside `[1, 10]`.
    #[error("invalid priority: {0}")]
    InvalidPriority(#[source] anyhow::Error),
    /// CREATE/UPDATE submitted with no `record`.
    #[error("kind {0:?} requires a non-null record")]
    MissingRecord(OperationKind),
}

impl Operation {
    /// Builds a new operation, validating that `priority ∈ [1, 10]` and that
    /// CREATE/UPDATE carry a `record`.
    ///
    /// `record_id` is left unvalidated here even though READ/UPDATE/DELETE
    /// need one: a READ/UPDATE/DELETE submitted without one is constructible
    /// and submittable, and only fails once a worker attempts to dispatch it
    /// (see [`syncd_dispatch`](https://docs.rs/syncd-dispatch)'s
    /// `DispatchError::MissingField("record_id")`), per §8's testable
    /// property that such an operation terminates in `dead_letter` rather
    /// than being rejected at submission.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] if any invariant is violated.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: OperationKind,
        provider: impl Into<String>,
        record_id: Option<String>,
        record: Option<HashMap<String, FieldValue>>,
        priority: u8,
        created_at: u64,
    ) -> Result<Self, OperationError> {
        check_in_range_inclusive_u8(priority, 1, 10, "priority")
            .map_err(OperationError::InvalidPriority)?;

        if kind.requires_record() && record.is_none() {
            return Err(OperationError::MissingRecord(kind));
        }

        Ok(Self {
            id: UUID4::new(),
            kind,
            provider: provider.into(),
            record_id,
            record,
            priority,
            created_at,
            scheduled_at: None,
            retry_count: 0,
            started_at: None,
            completed_at: None,
            external_id: None,
            error_message: None,
            response_data: None,
        })
    }

    /// Whether this operation is due for dispatch at `now` (unix seconds),
    /// i.e. `scheduled_at` is absent or not in the future.
    #[must_use]
    pub fn is_due_at(&self, now: u64) -> bool {
        self.scheduled_at.is_none_or(|at| at <= now)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn record() -> HashMap<String, FieldValue> {
        HashMap::from([("first_name".to_string(), FieldValue::from("A"))])
    }

    #[rstest]
    fn test_create_requires_record() {
        let err = Operation::new(OperationKind::Create, "sf", None, None, 5, 0).unwrap_err();
        assert!(matches!(err, OperationError::MissingRecord(OperationKind::Create)));
    }

    #[rstest]
    fn test_update_without_record_id_is_constructible() {
        // record_id is unvalidated at construction: a READ/UPDATE/DELETE
        // missing one is submittable and only fails at dispatch time.
        let op = Operation::new(OperationKind::Update, "sf", None, Some(record()), 5, 0).unwrap();
        assert!(op.record_id.is_none());
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    fn test_priority_out_of_range(#[case] priority: u8) {
        let err = Operation::new(
            OperationKind::Read,
            "sf",
            Some("1".into()),
            None,
            priority,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, OperationError::InvalidPriority(_)));
    }

    #[rstest]
    fn test_valid_create() {
        let op = Operation::new(OperationKind::Create, "sf", None, Some(record()), 5, 0).unwrap();
        assert_eq!(op.retry_count, 0);
        assert!(op.scheduled_at.is_none());
    }

    #[rstest]
    fn test_is_due_at() {
        let mut op = Operation::new(OperationKind::Create, "sf", None, Some(record()), 5, 0).unwrap();
        assert!(op.is_due_at(100));
        op.scheduled_at = Some(200);
        assert!(!op.is_due_at(100));
        assert!(op.is_due_at(200));
    }
}
