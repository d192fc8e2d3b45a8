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

//! The dynamic scalar backing every field in an operation's `record`.
//!
//! A `record` is a heterogeneous dictionary, so each value is tagged rather
//! than typed at the Rust level; the transformer registry operates
//! exclusively on this type and is never parameterized on a destination
//! schema.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single field value within an operation's record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A UTF-8 string value.
    String(String),
    /// A 64-bit floating point number (integral values are represented exactly up to 2^53).
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// The absence of a value.
    Null,
}

impl FieldValue {
    /// Returns `true` if this value is [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value in its string form, used by built-in transformers
    /// that operate on the textual representation of a value.
    ///
    /// Returns `None` for [`FieldValue::Null`].
    #[must_use]
    pub fn as_string_form(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null => None,
        }
    }
}

/// Formats a number without a trailing `.0` for integral values, matching
/// how a dynamically-typed source record would render e.g. `42` vs `42.5`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Option<FieldValue>> for FieldValue {
    fn from(value: Option<FieldValue>) -> Self {
        value.unwrap_or(Self::Null)
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
    fn test_is_null() {
        assert!(FieldValue::Null.is_null());
        assert!(!FieldValue::Bool(false).is_null());
    }

    #[rstest]
    #[case(FieldValue::Number(42.0), "42")]
    #[case(FieldValue::Number(42.5), "42.5")]
    #[case(FieldValue::Bool(true), "true")]
    #[case(FieldValue::String("hi".into()), "hi")]
    fn test_as_string_form(#[case] value: FieldValue, #[case] expected: &str) {
        assert_eq!(value.as_string_form().unwrap(), expected);
    }

    #[rstest]
    fn test_null_has_no_string_form() {
        assert!(FieldValue::Null.as_string_form().is_none());
    }

    #[rstest]
    fn test_serde_round_trip() {
        let values = vec![
            FieldValue::String("a".into()),
            FieldValue::Number(1.5),
            FieldValue::Bool(true),
            FieldValue::Null,
        ];
        for value in values {
            let json = serde_json::to_string(&value).unwrap();
            let back: FieldValue = serde_json::from_str(&json).unwrap();
            assert_eq!(value.to_string(), back.to_string());
        }
    }
}
