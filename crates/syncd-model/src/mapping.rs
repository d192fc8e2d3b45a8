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

//! A schema mapping rule: `(internal_field, external_field, transformer_name?, required)`.

use serde::{Deserialize, Serialize};

/// Direction a [`Mapping`] set is applied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Internal record → destination wire shape.
    InternalToExternal,
    /// Destination wire shape → internal record.
    ExternalToInternal,
}

/// One field-projection rule used by the schema transformer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mapping {
    /// Field name on the internal record.
    pub internal_field: String,
    /// Field name on the destination wire shape.
    pub external_field: String,
    /// Name of a registered transformer applied to the source value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer_name: Option<String>,
    /// Whether a null source value fails the transform rather than being
    /// omitted from the output.
    pub required: bool,
}

impl Mapping {
    /// Builds a mapping with no transformer and `required = false`.
    #[must_use]
    pub fn simple(internal_field: impl Into<String>, external_field: impl Into<String>) -> Self {
        Self {
            internal_field: internal_field.into(),
            external_field: external_field.into(),
            transformer_name: None,
            required: false,
        }
    }

    /// Builds a mapping with `required = true` and no transformer.
    #[must_use]
    pub fn required(internal_field: impl Into<String>, external_field: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::simple(internal_field, external_field)
        }
    }

    /// Attaches a transformer name to this mapping.
    #[must_use]
    pub fn with_transformer(mut self, name: impl Into<String>) -> Self {
        self.transformer_name = Some(name.into());
        self
    }

    /// Returns the `(source_field, target_field)` pair for `direction`.
    #[must_use]
    pub fn fields_for(&self, direction: Direction) -> (&str, &str) {
        match direction {
            Direction::InternalToExternal => (&self.internal_field, &self.external_field),
            Direction::ExternalToInternal => (&self.external_field, &self.internal_field),
        }
    }
}
