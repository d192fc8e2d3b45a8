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

//! URL and HTTP-method selection as a function of `(provider_kind,
//! operation_kind, record_id?)`, per §4.4's table.
//!
//! SALESFORCE and HUBSPOT use `PATCH` for UPDATE; PIPEDRIVE and CUSTOM use
//! `PUT`.

use reqwest::Method;
use syncd_model::{OperationKind, ProviderKind};

/// Resolves the `(method, path)` pair for `kind` dispatched against
/// `provider_kind`, joining `record_id` into the path for
/// READ/UPDATE/DELETE.
///
/// `record_id` is required (and only meaningful) for READ/UPDATE/DELETE, but
/// is not validated before dispatch — `Operation::new` leaves it
/// unvalidated, so a READ/UPDATE/DELETE can reach here with none. Returns
/// `None` in that case rather than silently building a path with an empty
/// path segment; the caller surfaces this as `DispatchError::MissingField`.
#[must_use]
pub fn resolve(kind: OperationKind, provider_kind: ProviderKind, record_id: Option<&str>) -> Option<(Method, String)> {
    let collection = match provider_kind {
        ProviderKind::Salesforce => "/services/data/v52.0/sobjects/Contact",
        ProviderKind::Hubspot => "/crm/v3/objects/contacts",
        ProviderKind::Pipedrive => "/v1/persons",
        ProviderKind::Custom => "/contacts",
    };

    Some(match kind {
        OperationKind::Create => (Method::POST, collection.to_string()),
        OperationKind::Read => (Method::GET, member_path(collection, record_id)?),
        OperationKind::Update => (update_method(provider_kind), member_path(collection, record_id)?),
        OperationKind::Delete => (Method::DELETE, member_path(collection, record_id)?),
    })
}

fn member_path(collection: &str, record_id: Option<&str>) -> Option<String> {
    Some(format!("{collection}/{}", record_id?))
}

const fn update_method(provider_kind: ProviderKind) -> Method {
    match provider_kind {
        ProviderKind::Salesforce | ProviderKind::Hubspot => Method::PATCH,
        ProviderKind::Pipedrive | ProviderKind::Custom => Method::PUT,
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
    #[case(ProviderKind::Salesforce, "/services/data/v52.0/sobjects/Contact")]
    #[case(ProviderKind::Hubspot, "/crm/v3/objects/contacts")]
    #[case(ProviderKind::Pipedrive, "/v1/persons")]
    #[case(ProviderKind::Custom, "/contacts")]
    fn test_create_path(#[case] kind: ProviderKind, #[case] expected: &str) {
        let (method, path) = resolve(OperationKind::Create, kind, None).unwrap();
        assert_eq!(method, Method::POST);
        assert_eq!(path, expected);
    }

    #[rstest]
    #[case(ProviderKind::Salesforce, Method::PATCH)]
    #[case(ProviderKind::Hubspot, Method::PATCH)]
    #[case(ProviderKind::Pipedrive, Method::PUT)]
    #[case(ProviderKind::Custom, Method::PUT)]
    fn test_update_method_per_provider(#[case] kind: ProviderKind, #[case] expected: Method) {
        let (method, path) = resolve(OperationKind::Update, kind, Some("42")).unwrap();
        assert_eq!(method, expected);
        assert!(path.ends_with("/42"));
    }

    #[rstest]
    fn test_delete_uses_member_path() {
        let (method, path) = resolve(OperationKind::Delete, ProviderKind::Custom, Some("7")).unwrap();
        assert_eq!(method, Method::DELETE);
        assert_eq!(path, "/contacts/7");
    }

    #[rstest]
    #[case(OperationKind::Read)]
    #[case(OperationKind::Update)]
    #[case(OperationKind::Delete)]
    fn test_missing_record_id_yields_none(#[case] kind: OperationKind) {
        assert!(resolve(kind, ProviderKind::Custom, None).is_none());
    }
}
