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

//! Tier membership as an explicit tagged variant.
//!
//! An operation is present in exactly one tier at any observable moment
//! (the atomic pending→in_flight handoff aside). `move_operation` in
//! `syncd-store` is the sole transition primitive between tiers.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One of the five backing-store collections partitioning operations by
/// lifecycle stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Priority-ordered set of operations awaiting a worker.
    Pending,
    /// Priority-ordered set of operations currently owned by a worker.
    InFlight,
    /// Append-only list of successfully dispatched operations.
    Completed,
    /// Reserved for externally-injected terminal failures; unused by the
    /// worker loop but still scanned by the status query.
    Failed,
    /// Append-only list of operations that exhausted their retry budget.
    DeadLetter,
}

impl Tier {
    /// All tiers, in the order the status query scans them.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InFlight,
        Self::Completed,
        Self::Failed,
        Self::DeadLetter,
    ];

    /// The backing-store key for this tier, per the persisted state layout.
    #[must_use]
    pub const fn store_key(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::DeadLetter => "dead_letter",
        }
    }

    /// Whether this tier is a priority-ordered set (`true`) or an
    /// append-only list (`false`).
    #[must_use]
    pub const fn is_ordered_set(self) -> bool {
        matches!(self, Self::Pending | Self::InFlight)
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.store_key())
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
    #[case(Tier::Pending, "pending", true)]
    #[case(Tier::InFlight, "in_flight", true)]
    #[case(Tier::Completed, "completed", false)]
    #[case(Tier::Failed, "failed", false)]
    #[case(Tier::DeadLetter, "dead_letter", false)]
    fn test_store_key_and_ordering(
        #[case] tier: Tier,
        #[case] key: &str,
        #[case] ordered: bool,
    ) {
        assert_eq!(tier.store_key(), key);
        assert_eq!(tier.is_ordered_set(), ordered);
        assert_eq!(tier.to_string(), key);
    }

    #[rstest]
    fn test_all_covers_five_tiers() {
        assert_eq!(Tier::ALL.len(), 5);
    }
}
