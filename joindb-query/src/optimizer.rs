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

//! Cost-based strategy selection.
//!
//! The hash join wins whenever a memory-resident (or cheaply spillable)
//! build table over the smaller file is plausible; the merge join is the
//! fallback that trades CPU and I/O for a memory ceiling independent of
//! input size. The decision needs nothing beyond the two file sizes and
//! the budget.

use std::path::Path;

use tracing::debug;

use joindb_core::{OptimizerConfig, Result};

use crate::strategy::{order_by_size, StrategyKind};

/// Pick the cheaper of hash and merge for the given inputs and budget.
///
/// Evaluated in order, with `file1` the smaller operand:
/// 1. both files small and the smaller file within a modest multiple of
///    the budget -> hash;
/// 2. sizes heavily skewed and enough budget to hash the smaller side ->
///    hash;
/// 3. otherwise -> merge.
pub fn optimal_strategy(
    file1: &Path,
    file2: &Path,
    mem_limit: u64,
    config: &OptimizerConfig,
) -> Result<StrategyKind> {
    let (_, _, file1_size, file2_size) = order_by_size(file1, file2)?;

    let file_to_mem_ratio = file1_size as f64 / mem_limit as f64;
    let file_to_file_ratio = file2_size as f64 / file1_size as f64;

    let kind = if file1_size <= config.small_file
        && file2_size <= config.small_file
        && file_to_mem_ratio <= config.file_to_file
    {
        StrategyKind::Hash
    } else if file_to_file_ratio >= config.file_to_file
        && file_to_mem_ratio <= config.file_to_mem
    {
        StrategyKind::Hash
    } else {
        StrategyKind::Merge
    };

    debug!(
        file1_size,
        file2_size,
        mem_limit,
        file_to_mem_ratio,
        file_to_file_ratio,
        strategy = %kind,
        "optimizer decision"
    );
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempPath};

    /// File whose reported size is `bytes` without materializing the data.
    fn file_of_size(bytes: u64) -> TempPath {
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(bytes).unwrap();
        file.into_temp_path()
    }

    #[test]
    fn test_small_files_choose_hash() {
        let config = OptimizerConfig::default();
        let small = file_of_size(config.small_file * 9 / 10);
        let other = file_of_size(config.small_file * 9 / 10);

        let mem_limit = config.small_file * 9 / 10 * 7 / 4;
        let kind = optimal_strategy(&small, &other, mem_limit, &config).unwrap();
        assert_eq!(kind, StrategyKind::Hash);
    }

    #[test]
    fn test_skewed_sizes_choose_hash() {
        let config = OptimizerConfig::default();
        let small = file_of_size(config.small_file * 9 / 10);
        let medium = file_of_size((config.small_file + config.large_file) / 2);

        let mem_limit = config.small_file * 9 / 10 * 7 / 4;
        let kind = optimal_strategy(&small, &medium, mem_limit, &config).unwrap();
        assert_eq!(kind, StrategyKind::Hash);
    }

    #[test]
    fn test_two_big_files_choose_merge() {
        let config = OptimizerConfig::default();
        let big1 = file_of_size(config.large_file * 2);
        let big2 = file_of_size(config.large_file * 2);

        let mem_limit = config.small_file;
        let kind = optimal_strategy(&big1, &big2, mem_limit, &config).unwrap();
        assert_eq!(kind, StrategyKind::Merge);
    }

    #[test]
    fn test_big_pair_with_insufficient_skew_chooses_merge() {
        let config = OptimizerConfig::default();
        let big = file_of_size(config.large_file);
        let bigger = file_of_size(config.large_file * 2);

        let kind = optimal_strategy(&big, &bigger, config.small_file, &config).unwrap();
        assert_eq!(kind, StrategyKind::Merge);
    }

    #[test]
    fn test_argument_order_is_irrelevant() {
        let config = OptimizerConfig::default();
        let small = file_of_size(1024);
        let large = file_of_size(config.large_file * 3);
        let mem_limit = 4096;

        let a = optimal_strategy(&small, &large, mem_limit, &config).unwrap();
        let b = optimal_strategy(&large, &small, mem_limit, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, StrategyKind::Hash);
    }
}
