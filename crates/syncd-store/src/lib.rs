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

//! The backing-store abstraction: ordered-set + list + counter primitives
//! over the five tiers, an in-memory fake for tests, and a Redis adapter for
//! production use.
//!
//! - **Redis integration**: tiers, metrics counters, and the atomic
//!   pop-and-move handoff, all against a single shared Redis instance.
//! - **In-memory fake**: the same contract with no external dependency, used
//!   by the rest of the workspace's unit and property tests.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod redis;

pub use crate::{
    backend::BackingStore, config::DatabaseConfig, error::StoreError, memory::InMemoryBackingStore,
    redis::RedisBackingStore,
};
