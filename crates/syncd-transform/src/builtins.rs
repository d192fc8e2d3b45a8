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

//! Built-in named pure functions over a single [`FieldValue`].
//!
//! Modeled as a closed tagged set so an unknown name is a single lookup
//! failure rather than a scattered set of string matches.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use syncd_model::FieldValue;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static NON_ALNUM_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ]").unwrap());

/// The closed set of transformer names the registry ships with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinTransformer {
    /// Uppercases the string form.
    ToUpper,
    /// Lowercases the string form.
    ToLower,
    /// Coerces to the string form.
    ToString,
    /// Parses the string form as an integer.
    ToInt,
    /// Parses the string form as a float.
    ToFloat,
    /// Parses the string form as a boolean.
    ToBool,
    /// Normalizes a phone number to E.164-ish `+1XXXXXXXXXX` form.
    FormatPhone,
    /// Trims and lowercases an email address, validating its shape.
    FormatEmail,
    /// Normalizes a date/timestamp to an ISO-8601 string.
    FormatDate,
    /// Strips `<...>` tag-shaped substrings.
    CleanHtml,
    /// Truncates the string form to 255 characters.
    Truncate255,
    /// Keeps only `[A-Za-z0-9 ]` characters.
    RemoveSpecialChars,
}

impl BuiltinTransformer {
    /// Looks up a built-in by its registered name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "to_upper" => Self::ToUpper,
            "to_lower" => Self::ToLower,
            "to_string" => Self::ToString,
            "to_int" => Self::ToInt,
            "to_float" => Self::ToFloat,
            "to_bool" => Self::ToBool,
            "format_phone" => Self::FormatPhone,
            "format_email" => Self::FormatEmail,
            "format_date" => Self::FormatDate,
            "clean_html" => Self::CleanHtml,
            "truncate_255" => Self::Truncate255,
            "remove_special_chars" => Self::RemoveSpecialChars,
            _ => return None,
        })
    }

    /// Applies this transformer to `value`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason string on failure (e.g. an
    /// unparseable `to_int`/`to_float`/`to_bool` input).
    pub fn apply(self, value: &FieldValue) -> Result<FieldValue, String> {
        match self {
            Self::ToUpper => Ok(map_string_form(value, |s| s.to_uppercase())),
            Self::ToLower => Ok(map_string_form(value, |s| s.to_lowercase())),
            Self::ToString => Ok(map_string_form(value, |s| s)),
            Self::ToInt => to_int(value),
            Self::ToFloat => to_float(value),
            Self::ToBool => to_bool(value),
            Self::FormatPhone => Ok(format_phone(value)),
            Self::FormatEmail => Ok(format_email(value)),
            Self::FormatDate => Ok(format_date(value)),
            Self::CleanHtml => Ok(clean_html(value)),
            Self::Truncate255 => Ok(truncate_255(value)),
            Self::RemoveSpecialChars => Ok(remove_special_chars(value)),
        }
    }
}

/// `true` for null or empty-string input, per "all built-ins return null
/// for null/empty input".
fn is_nullish(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => true,
        FieldValue::String(s) => s.is_empty(),
        _ => false,
    }
}

fn map_string_form(value: &FieldValue, f: impl FnOnce(String) -> String) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    value
        .as_string_form()
        .map_or(FieldValue::Null, |s| FieldValue::String(f(s)))
}

fn to_int(value: &FieldValue) -> Result<FieldValue, String> {
    if is_nullish(value) {
        return Ok(FieldValue::Null);
    }
    let Some(s) = value.as_string_form() else {
        return Ok(FieldValue::Null);
    };
    s.trim()
        .parse::<f64>()
        .map(|n| FieldValue::Number(n.trunc()))
        .map_err(|_| format!("`{s}` is not a valid integer"))
}

fn to_float(value: &FieldValue) -> Result<FieldValue, String> {
    if is_nullish(value) {
        return Ok(FieldValue::Null);
    }
    let Some(s) = value.as_string_form() else {
        return Ok(FieldValue::Null);
    };
    s.trim()
        .parse::<f64>()
        .map(FieldValue::Number)
        .map_err(|_| format!("`{s}` is not a valid float"))
}

fn to_bool(value: &FieldValue) -> Result<FieldValue, String> {
    if is_nullish(value) {
        return Ok(FieldValue::Null);
    }
    if let FieldValue::Bool(b) = value {
        return Ok(FieldValue::Bool(*b));
    }
    let Some(s) = value.as_string_form() else {
        return Ok(FieldValue::Null);
    };
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(FieldValue::Bool(true)),
        "false" | "0" | "no" => Ok(FieldValue::Bool(false)),
        other => Err(format!("`{other}` is not a valid boolean")),
    }
}

fn format_phone(value: &FieldValue) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    let Some(s) = value.as_string_form() else {
        return FieldValue::Null;
    };
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        FieldValue::String(format!("+1{digits}"))
    } else if digits.len() == 11 && digits.starts_with('1') {
        FieldValue::String(format!("+{digits}"))
    } else {
        FieldValue::String(s)
    }
}

fn format_email(value: &FieldValue) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    let Some(s) = value.as_string_form() else {
        return FieldValue::Null;
    };
    let normalized = s.trim().to_lowercase();
    match normalized.rsplit_once('@') {
        Some((_, domain)) if domain.contains('.') => FieldValue::String(normalized),
        _ => FieldValue::Null,
    }
}

fn format_date(value: &FieldValue) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    if let FieldValue::Number(secs) = value {
        #[allow(clippy::cast_possible_truncation)]
        let dt = DateTime::<Utc>::from_timestamp(*secs as i64, 0);
        return dt.map_or(FieldValue::Null, |dt| FieldValue::String(dt.to_rfc3339()));
    }
    let Some(s) = value.as_string_form() else {
        return FieldValue::Null;
    };
    parse_common_date(&s).map_or_else(|| FieldValue::String(s.clone()), FieldValue::String)
}

/// Tries a handful of common wire formats before giving up.
fn parse_common_date(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for fmt in FORMATS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().to_rfc3339());
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc().to_rfc3339());
        }
    }
    None
}

fn clean_html(value: &FieldValue) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    let Some(s) = value.as_string_form() else {
        return FieldValue::Null;
    };
    FieldValue::String(HTML_TAG.replace_all(&s, "").trim().to_string())
}

fn truncate_255(value: &FieldValue) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    let Some(s) = value.as_string_form() else {
        return FieldValue::Null;
    };
    FieldValue::String(s.chars().take(255).collect())
}

fn remove_special_chars(value: &FieldValue) -> FieldValue {
    if is_nullish(value) {
        return FieldValue::Null;
    }
    let Some(s) = value.as_string_form() else {
        return FieldValue::Null;
    };
    FieldValue::String(NON_ALNUM_SPACE.replace_all(&s, "").trim().to_string())
}
