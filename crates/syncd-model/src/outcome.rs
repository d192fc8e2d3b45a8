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

//! The typed result of one successful dispatch attempt, feeding the
//! worker's outcome-routing switch.

use serde::{Deserialize, Serialize};

/// A successful dispatch's captured response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// The decoded response body (`{status: "success", data: <text>}` for a
    /// non-JSON 2xx response).
    pub body: serde_json::Value,
    /// For `CREATE`, the id assigned by the destination, when present in
    /// the response under `id`.
    pub external_id: Option<String>,
}

impl DispatchOutcome {
    /// Builds an outcome from a decoded body, extracting `external_id` from
    /// a top-level `id` field when present and string-shaped.
    #[must_use]
    pub fn from_body(body: serde_json::Value) -> Self {
        let external_id = body
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Self { body, external_id }
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
    fn test_external_id_extracted_when_present() {
        let outcome = DispatchOutcome::from_body(serde_json::json!({"id": "x"}));
        assert_eq!(outcome.external_id.as_deref(), Some("x"));
    }

    #[rstest]
    fn test_external_id_absent_for_non_string_id() {
        let outcome = DispatchOutcome::from_body(serde_json::json!({"id": 42}));
        assert!(outcome.external_id.is_none());
    }

    #[rstest]
    fn test_external_id_absent_without_id_field() {
        let outcome = DispatchOutcome::from_body(serde_json::json!({"status": "success"}));
        assert!(outcome.external_id.is_none());
    }
}
