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

//! Network-facing primitives for the sync dispatcher: exponential backoff
//! for retry scheduling, and per-destination token-bucket admission
//! control sitting in front of outbound HTTP dispatch.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backoff;
pub mod bucket;
pub mod ratelimiter;

pub use crate::{
    backoff::ExponentialBackoff,
    bucket::{BucketBackend, BucketOutcome, BucketStatus, InMemoryBucketBackend, RedisBucketBackend},
    ratelimiter::{ProviderBudget, RateLimiterManager},
};
