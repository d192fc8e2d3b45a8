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

//! Projects one field dictionary onto another via a [`Mapping`] set.

use std::collections::HashMap;

use syncd_model::{Direction, FieldValue, Mapping};

use crate::{error::TransformError, registry::TransformerRegistry};

/// Projects `record` through `mappings` in `direction`:
///
/// 1. Resolve `(source_field, target_field)` for each mapping.
/// 2. Read the source value (a missing key is treated as null).
/// 3. A null source on a `required` mapping fails with `MissingField`.
/// 4. A named transformer is applied to a non-null source; an unknown name
///    always fails with `TransformationError`, while a function failure
///    only fails the whole transform when the mapping is `required` — an
///    optional mapping instead drops the field and logs a warning.
/// 5. Non-null results are emitted under the target field; nulls are
///    omitted entirely.
///
/// # Errors
///
/// Returns the first [`TransformError`] encountered, per mapping ordering.
pub fn transform(
    record: &HashMap<String, FieldValue>,
    mappings: &[Mapping],
    direction: Direction,
    registry: &TransformerRegistry,
) -> Result<HashMap<String, FieldValue>, TransformError> {
    let mut output = HashMap::with_capacity(mappings.len());

    for mapping in mappings {
        let (source_field, target_field) = mapping.fields_for(direction);
        let source = record.get(source_field).cloned().unwrap_or(FieldValue::Null);

        if mapping.required && source.is_null() {
            return Err(TransformError::MissingField(source_field.to_string()));
        }

        let value = match (&mapping.transformer_name, source.is_null()) {
            (Some(name), false) => match registry.apply(name, &source) {
                Ok(transformed) => transformed,
                Err(None) => {
                    return Err(TransformError::unknown_transformer(source_field, name));
                }
                Err(Some(reason)) if mapping.required => {
                    return Err(TransformError::TransformationError {
                        field: source_field.to_string(),
                        reason,
                    });
                }
                Err(Some(reason)) => {
                    tracing::warn!(
                        field = source_field,
                        transformer = name.as_str(),
                        reason = reason.as_str(),
                        "optional field transform failed, dropping field"
                    );
                    FieldValue::Null
                }
            },
            _ => source,
        };

        if !value.is_null() {
            output.insert(target_field.to_string(), value);
        }
    }

    Ok(output)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use syncd_model::default_mappings;
    use syncd_model::ProviderKind;

    use super::*;

    fn sf_mappings() -> Vec<Mapping> {
        default_mappings(ProviderKind::Salesforce)
    }

    #[rstest]
    fn test_happy_path_create() {
        let record = HashMap::from([
            ("first_name".to_string(), FieldValue::from("A")),
            ("last_name".to_string(), FieldValue::from("B")),
        ]);
        let out = transform(
            &record,
            &sf_mappings(),
            Direction::InternalToExternal,
            &TransformerRegistry::new(),
        )
        .unwrap();
        assert_eq!(out.get("FirstName").unwrap().to_string(), "A");
        assert_eq!(out.get("LastName").unwrap().to_string(), "B");
    }

    #[rstest]
    fn test_missing_required_field() {
        let record = HashMap::from([("first_name".to_string(), FieldValue::from("A"))]);
        let err = transform(
            &record,
            &sf_mappings(),
            Direction::InternalToExternal,
            &TransformerRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::MissingField(field) if field == "last_name"));
    }

    #[rstest]
    fn test_unknown_transformer_always_errors() {
        let record = HashMap::from([("x".to_string(), FieldValue::from("y"))]);
        let mappings = vec![Mapping::simple("x", "X").with_transformer("nope")];
        let err = transform(
            &record,
            &mappings,
            Direction::InternalToExternal,
            &TransformerRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::TransformationError { .. }));
    }

    #[rstest]
    fn test_optional_transform_failure_drops_field() {
        let record = HashMap::from([("org".to_string(), FieldValue::from("not-a-number"))]);
        let mappings = vec![Mapping::simple("org", "org_id").with_transformer("to_int")];
        let out = transform(
            &record,
            &mappings,
            Direction::InternalToExternal,
            &TransformerRegistry::new(),
        )
        .unwrap();
        assert!(!out.contains_key("org_id"));
    }

    #[rstest]
    fn test_null_values_are_omitted() {
        let record = HashMap::from([("last_name".to_string(), FieldValue::from("B"))]);
        let out = transform(
            &record,
            &sf_mappings(),
            Direction::InternalToExternal,
            &TransformerRegistry::new(),
        )
        .unwrap();
        assert!(!out.contains_key("FirstName"));
    }

    #[rstest]
    fn test_transformer_identity_round_trip() {
        let mappings = vec![
            Mapping::simple("a", "A"),
            Mapping::simple("b", "B"),
        ];
        let record = HashMap::from([
            ("a".to_string(), FieldValue::from("1")),
            ("b".to_string(), FieldValue::from("2")),
        ]);
        let registry = TransformerRegistry::new();
        let external = transform(&record, &mappings, Direction::InternalToExternal, &registry)
            .unwrap();
        let back = transform(&external, &mappings, Direction::ExternalToInternal, &registry)
            .unwrap();
        assert_eq!(back.get("a").unwrap().to_string(), "1");
        assert_eq!(back.get("b").unwrap().to_string(), "2");
    }
}
