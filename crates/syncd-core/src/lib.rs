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

//! Core foundational types shared by every crate in the sync dispatcher.
//!
//! This crate is deliberately small: it supplies the identifiers, clock,
//! and correctness-checking primitives used across the workspace, with
//! no dependency on the domain types defined further up the stack
//! (`syncd-model`, `syncd-transform`, etc.).
//!
//! - Time handling and atomic clock functionality.
//! - UUID generation for operation identifiers.
//! - Correctness validation functions used at API boundaries.
//! - Shared constants (user-agent string, crate name/version).

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod consts;
pub mod correctness;
pub mod nanos;
pub mod time;
pub mod uuid;

// Re-exports
pub use crate::{nanos::UnixNanos, time::AtomicTime, uuid::UUID4};
