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

//! Default internal→external field mappings the transformer ships with,
//! one per provider kind.

use crate::{Mapping, ProviderKind};

/// Returns the built-in mapping set for `kind`.
#[must_use]
pub fn default_mappings(kind: ProviderKind) -> Vec<Mapping> {
    match kind {
        ProviderKind::Salesforce => vec![
            Mapping::simple("first_name", "FirstName"),
            Mapping::required("last_name", "LastName"),
            Mapping::simple("email", "Email").with_transformer("format_email"),
            Mapping::simple("phone", "Phone").with_transformer("format_phone"),
            Mapping::simple("company_id", "AccountId"),
            Mapping::simple("title", "Title"),
        ],
        ProviderKind::Hubspot => vec![
            Mapping::simple("first_name", "firstname"),
            Mapping::required("last_name", "lastname"),
            Mapping::simple("email", "email").with_transformer("format_email"),
            Mapping::simple("phone", "phone").with_transformer("format_phone"),
            Mapping::simple("company_name", "company"),
            Mapping::simple("title", "jobtitle"),
        ],
        ProviderKind::Pipedrive => vec![
            Mapping::required("full_name", "name"),
            Mapping::simple("email", "email").with_transformer("format_email"),
            Mapping::simple("phone", "phone").with_transformer("format_phone"),
            Mapping::simple("organization_id", "org_id").with_transformer("to_int"),
        ],
        ProviderKind::Custom => Vec::new(),
    }
}
