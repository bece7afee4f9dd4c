// Copyright 2026 JoinDB Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core constants, configuration, and error taxonomy for JoinDB.
//!
//! Every byte of capacity arithmetic in the storage and query layers is
//! derived from the two cost constants defined here ([`ELEMENT_COST`] and
//! [`ELEMENT_WIDTH`]); they are deliberately explicit rather than measured
//! at runtime so that memory plans are stable and reviewable.

pub mod config;
pub mod error;

pub use config::{HashJoinConfig, JoinConfig, MergeJoinConfig, OptimizerConfig};
pub use error::{JoinError, Result};

/// One byte.
pub const BYTE: u64 = 1;

/// One mebibyte.
pub const MEGABYTE: u64 = BYTE << 20;

/// Smallest memory budget a caller may supply (1 MB).
pub const MIN_MEMORY_BUDGET: u64 = MEGABYTE;

/// Largest input file the engine accepts (500 MB).
pub const MAX_FILE_SIZE: u64 = 500 * MEGABYTE;

/// Inclusive lower bound of the element domain.
pub const MIN_ELEMENT: u64 = 0;

/// Exclusive upper bound of the element domain: elements live in
/// `[0, 2^63)`.
pub const MAX_ELEMENT: u64 = 1 << 63;

/// Bytes charged against the memory budget for one element resident in an
/// in-memory hash set: an 8-byte `u64` slot plus table overhead (control
/// bytes and the slack implied by the load factor).
pub const ELEMENT_COST: u64 = 16;

/// Maximum encoded width of one element on disk: the 19 decimal digits of
/// `2^63 - 1` plus the newline terminator. Block budgets divide by this to
/// obtain a block size in elements.
pub const ELEMENT_WIDTH: u64 = 20;

/// Whether `element` lies inside the supported domain,
/// `[MIN_ELEMENT, MAX_ELEMENT)`.
#[inline]
pub fn element_in_domain(element: u64) -> bool {
    (MIN_ELEMENT..MAX_ELEMENT).contains(&element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_bounds() {
        assert!(element_in_domain(MIN_ELEMENT));
        assert!(element_in_domain(MAX_ELEMENT - 1));
        assert!(!element_in_domain(MAX_ELEMENT));
        assert!(!element_in_domain(u64::MAX));
    }

    #[test]
    fn test_element_width_covers_largest_value() {
        // 19 digits plus the newline.
        let widest = format!("{}\n", MAX_ELEMENT - 1);
        assert_eq!(widest.len() as u64, ELEMENT_WIDTH);
    }
}
