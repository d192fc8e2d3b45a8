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

//! Domain types shared by every crate above `syncd-core`: the `Operation`
//! unit of work, provider configuration, the dynamic `FieldValue` scalar,
//! tier membership and the schema mapping rule.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod defaults;
pub mod field_value;
pub mod mapping;
pub mod operation;
pub mod outcome;
pub mod provider;
pub mod status;
pub mod tier;

pub use crate::{
    auth::{Auth, CachedToken},
    defaults::default_mappings,
    field_value::FieldValue,
    mapping::{Direction, Mapping},
    operation::{Operation, OperationError, OperationKind},
    outcome::DispatchOutcome,
    provider::{ProviderConfig, ProviderKind},
    status::OperationStatus,
    tier::Tier,
};
