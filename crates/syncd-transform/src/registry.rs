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

//! The transformer registry: the closed [`BuiltinTransformer`] set plus an
//! open extension table for caller-registered functions.

use std::{collections::HashMap, fmt, sync::Arc};

use syncd_model::FieldValue;

use crate::builtins::BuiltinTransformer;

/// A user-registered transformer function.
pub type ExtensionFn = Arc<dyn Fn(&FieldValue) -> Result<FieldValue, String> + Send + Sync>;

/// Resolves transformer names to callables: built-ins first, then the
/// extension table, so a caller cannot shadow a built-in name by mistake.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    extensions: HashMap<String, ExtensionFn>,
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TransformerRegistry {
    /// Builds an empty registry with only the built-in functions available.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an additional named function, callable from a [`crate::Mapping`]'s
    /// `transformer_name`. Overwrites any previous registration under the
    /// same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&FieldValue) -> Result<FieldValue, String> + Send + Sync + 'static,
    ) {
        self.extensions.insert(name.into(), Arc::new(f));
    }

    /// Applies the transformer named `name` to `value`.
    ///
    /// # Errors
    ///
    /// Returns `Err(None)` if `name` is not registered as either a built-in
    /// or an extension; returns `Err(Some(reason))` if the function itself
    /// failed on `value`.
    pub fn apply(&self, name: &str, value: &FieldValue) -> Result<FieldValue, Option<String>> {
        if let Some(builtin) = BuiltinTransformer::from_name(name) {
            return builtin.apply(value).map_err(Some);
        }
        if let Some(f) = self.extensions.get(name) {
            return f(value).map_err(Some);
        }
        Err(None)
    }
}
