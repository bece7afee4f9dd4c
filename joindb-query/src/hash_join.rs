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

//! Bounded build/probe hash join.
//!
//! The smaller file populates a capacity-bounded build table; the larger
//! file is streamed block by block and probed against it. Probe hits land
//! in a separate result table, never back in the build table: conflating
//! the two would intersect the build side with itself and always produce
//! an empty result.
//!
//! ## Memory Plan
//!
//! Derived once per call, never mutated:
//!
//! ```text
//! build_budget  = min(file1_size * scale_up, mem_limit * build_threshold)
//! remaining     = mem_limit - build_budget
//! result_budget = remaining * result_ratio
//! block_budget  = remaining - result_budget
//! ```
//!
//! After the build phase, whatever build capacity went unused is handed to
//! the result table and simultaneously removed from the build table's own
//! ceiling, so freed budget cannot be claimed twice once probing starts.

use std::path::Path;

use tracing::debug;

use joindb_core::{JoinConfig, Result, ELEMENT_COST, ELEMENT_WIDTH};
use joindb_storage::{BlockReader, SpillableSet};

use crate::strategy::{order_by_size, Strategy};

pub struct HashJoin;

impl Strategy for HashJoin {
    fn intersect(
        &self,
        file1: &Path,
        file2: &Path,
        mem_limit: u64,
        config: &JoinConfig,
    ) -> Result<SpillableSet> {
        let (file1, file2, file1_size, _) = order_by_size(file1, file2)?;
        let plan = &config.hash;

        let build_budget = file1_size
            .saturating_mul(plan.scale_up)
            .min((mem_limit as f64 * plan.build_threshold) as u64);
        let remaining = mem_limit.saturating_sub(build_budget);
        let result_budget = (remaining as f64 * plan.result_ratio) as u64;
        let block_budget = remaining - result_budget;

        let build_capacity = (build_budget / ELEMENT_COST).max(1);
        let block_size = ((block_budget / ELEMENT_WIDTH).max(1)) as usize;

        debug!(
            build_budget,
            result_budget, block_budget, build_capacity, block_size, "hash join memory plan"
        );

        // Build phase: the smaller file fills the build table.
        let mut build = SpillableSet::with_capacity(build_capacity)?;
        for block in BlockReader::open(file1, block_size)? {
            for element in block? {
                build.add(element)?;
            }
        }

        // Reclaim unused build headroom for the result table. The build
        // table's ceiling drops by the same amount so the budget is not
        // counted twice.
        let unused = build.available_memory() / ELEMENT_COST;
        build.shrink_capacity(unused);
        let result_capacity = result_budget / ELEMENT_COST + unused;

        debug!(
            reclaimed_elements = unused,
            result_capacity, "hash join probe phase starting"
        );

        // Probe phase: hits from the larger file go into the result table.
        let mut result = SpillableSet::with_capacity(result_capacity)?;
        for block in BlockReader::open(file2, block_size)? {
            for element in block? {
                if build.contains(element)? {
                    result.add(element)?;
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joindb_core::MEGABYTE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_elements(elements: &[u64]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for e in elements {
            writeln!(file, "{e}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_basic_intersection() {
        let f1 = write_elements(&[1, 2, 3, 4]);
        let f2 = write_elements(&[3, 4, 5, 6]);

        let result = HashJoin
            .intersect(f1.path(), f2.path(), MEGABYTE, &JoinConfig::default())
            .unwrap();
        assert_eq!(result.cardinality(), 2);
        assert!(result.contains(3).unwrap());
        assert!(result.contains(4).unwrap());
    }

    #[test]
    fn test_disjoint_inputs() {
        let f1 = write_elements(&[1, 2, 3]);
        let f2 = write_elements(&[4, 5, 6]);

        let result = HashJoin
            .intersect(f1.path(), f2.path(), MEGABYTE, &JoinConfig::default())
            .unwrap();
        assert_eq!(result.cardinality(), 0);
    }

    #[test]
    fn test_identical_inputs() {
        let elements: Vec<u64> = (0..500).collect();
        let f1 = write_elements(&elements);
        let f2 = write_elements(&elements);

        let result = HashJoin
            .intersect(f1.path(), f2.path(), MEGABYTE, &JoinConfig::default())
            .unwrap();
        assert_eq!(result.cardinality(), 500);
    }

    #[test]
    fn test_caller_order_does_not_matter() {
        let small = write_elements(&[10, 20]);
        let large = write_elements(&(0..100).map(|i| i * 10).collect::<Vec<_>>());

        let config = JoinConfig::default();
        let a = HashJoin
            .intersect(small.path(), large.path(), MEGABYTE, &config)
            .unwrap();
        let b = HashJoin
            .intersect(large.path(), small.path(), MEGABYTE, &config)
            .unwrap();
        assert_eq!(a.cardinality(), 2);
        assert_eq!(b.cardinality(), 2);
    }

    #[test]
    fn test_spilling_build_table_still_correct() {
        // A tiny budget forces the build table to spill while probing
        // still has to find every common element.
        let elements: Vec<u64> = (0..5_000).collect();
        let f1 = write_elements(&elements);
        let f2 = write_elements(&(2_500..7_500).collect::<Vec<_>>());

        // 100 KB budget: build capacity tops out at 60_000 / 16 = 3750
        // elements, well under the 5000 in file1.
        let result = HashJoin
            .intersect(f1.path(), f2.path(), 100_000, &JoinConfig::default())
            .unwrap();
        assert_eq!(result.cardinality(), 2_500);
    }
}
