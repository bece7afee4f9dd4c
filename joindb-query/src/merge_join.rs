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

//! External-sort merge join.
//!
//! Both inputs are external-sorted into duplicate-free ascending files,
//! then merged with one cursor per stream over block-buffered reads. The
//! memory ceiling is independent of input size, which makes this the safe
//! fallback when neither file fits a hash build table.
//!
//! The merge stops the moment either stream runs dry: with both streams
//! sorted and duplicate-free, no further matches are possible.

use std::cmp::Ordering;
use std::path::Path;

use tracing::debug;

use joindb_core::{JoinConfig, Result, ELEMENT_COST, ELEMENT_WIDTH};
use joindb_storage::{external_sort, BlockReader, SpillableSet};

use crate::strategy::{order_by_size, Strategy};

/// Cursor over one sorted stream, refilling from its block reader as each
/// block is consumed.
struct BlockCursor {
    reader: BlockReader,
    block: Vec<u64>,
    pos: usize,
}

impl BlockCursor {
    fn new(mut reader: BlockReader) -> Result<Self> {
        let block = match reader.next() {
            Some(block) => block?,
            None => Vec::new(),
        };
        Ok(Self {
            reader,
            block,
            pos: 0,
        })
    }

    /// Element under the cursor, or None once the stream is exhausted.
    fn current(&self) -> Option<u64> {
        self.block.get(self.pos).copied()
    }

    fn advance(&mut self) -> Result<()> {
        self.pos += 1;
        if self.pos >= self.block.len() {
            match self.reader.next() {
                Some(block) => {
                    self.block = block?;
                    self.pos = 0;
                }
                None => {
                    self.block.clear();
                    self.pos = 0;
                }
            }
        }
        Ok(())
    }
}

pub struct MergeJoin;

impl Strategy for MergeJoin {
    fn intersect(
        &self,
        file1: &Path,
        file2: &Path,
        mem_limit: u64,
        config: &JoinConfig,
    ) -> Result<SpillableSet> {
        let (file1, file2, file1_size, _) = order_by_size(file1, file2)?;
        let plan = &config.merge;

        // The result can never exceed the smaller input, so its budget is
        // capped by a multiple of that file's size.
        let result_budget = ((mem_limit as f64 * plan.result_threshold) as u64)
            .min(file1_size.saturating_mul(plan.result_factor));
        let rest = mem_limit.saturating_sub(result_budget);
        let block_budget = rest / 2;
        let block_size = ((block_budget / ELEMENT_WIDTH).max(1)) as usize;

        debug!(
            result_budget,
            block_budget, block_size, "merge join memory plan"
        );

        let sorted1 = external_sort(file1, mem_limit)?;
        let sorted2 = external_sort(file2, mem_limit)?;

        let mut result = SpillableSet::with_capacity(result_budget / ELEMENT_COST)?;

        let mut left = BlockCursor::new(BlockReader::open(sorted1.path(), block_size)?)?;
        let mut right = BlockCursor::new(BlockReader::open(sorted2.path(), block_size)?)?;

        // Either cursor running dry ends the whole merge.
        while let (Some(l), Some(r)) = (left.current(), right.current()) {
            match l.cmp(&r) {
                Ordering::Equal => {
                    result.add(l)?;
                    left.advance()?;
                    right.advance()?;
                }
                Ordering::Less => left.advance()?,
                Ordering::Greater => right.advance()?,
            }
        }

        Ok(result)
    }
}
