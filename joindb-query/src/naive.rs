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

//! Naive baseline strategy.
//!
//! Ignores the memory budget entirely: loads both files as in-memory sets,
//! intersects them, and pours the result into an unbounded spillable set.
//! Exists to cross-check the bounded strategies, not for production-scale
//! inputs.

use std::collections::HashSet;
use std::path::Path;

use joindb_core::{JoinConfig, Result};
use joindb_storage::{BlockReader, SpillableSet};

use crate::strategy::{order_by_size, Strategy};

/// Block size used for the unbounded full-file reads.
const READ_BLOCK: usize = 1 << 16;

pub struct Naive;

impl Naive {
    fn load(path: &Path) -> Result<HashSet<u64>> {
        let mut set = HashSet::new();
        for block in BlockReader::open(path, READ_BLOCK)? {
            set.extend(block?);
        }
        Ok(set)
    }
}

impl Strategy for Naive {
    fn intersect(
        &self,
        file1: &Path,
        file2: &Path,
        _mem_limit: u64,
        _config: &JoinConfig,
    ) -> Result<SpillableSet> {
        let (file1, file2, ..) = order_by_size(file1, file2)?;

        let set1 = Self::load(file1)?;
        let set2 = Self::load(file2)?;

        let mut result = SpillableSet::unbounded()?;
        for &element in set1.intersection(&set2) {
            result.add(element)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

        let result = Naive
            .intersect(f1.path(), f2.path(), 0, &JoinConfig::default())
            .unwrap();
        assert_eq!(result.cardinality(), 2);
        assert!(result.contains(3).unwrap());
        assert!(result.contains(4).unwrap());
    }

    #[test]
    fn test_empty_left_side() {
        let f1 = write_elements(&[]);
        let f2 = write_elements(&[1, 2, 3]);

        let result = Naive
            .intersect(f1.path(), f2.path(), 0, &JoinConfig::default())
            .unwrap();
        assert_eq!(result.cardinality(), 0);
    }
}
