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

//! Tuning knobs for the join strategies and the optimizer.
//!
//! Each strategy derives its memory plan once per intersect call from the
//! caller's byte budget and the ratios below; the plan is never mutated
//! afterwards. The defaults are the empirically chosen values the engine
//! ships with.

use crate::MEGABYTE;

/// Memory-plan ratios for the bounded hash join.
#[derive(Debug, Clone)]
pub struct HashJoinConfig {
    /// Multiplier applied to the smaller file's byte size when estimating
    /// how much memory a fully resident build table would need.
    pub scale_up: u64,
    /// Fraction of the total budget the build table may claim.
    pub build_threshold: f64,
    /// Fraction of the post-build remainder reserved for the result table;
    /// the rest pays for block read buffers.
    pub result_ratio: f64,
}

impl Default for HashJoinConfig {
    fn default() -> Self {
        Self {
            scale_up: 4,
            build_threshold: 0.6,
            result_ratio: 0.6,
        }
    }
}

/// Memory-plan ratios for the external-sort merge join.
#[derive(Debug, Clone)]
pub struct MergeJoinConfig {
    /// Fraction of the total budget the result table may claim.
    pub result_threshold: f64,
    /// Multiplier applied to the smaller file's byte size to cap the result
    /// budget (the intersection can never exceed the smaller input).
    pub result_factor: u64,
}

impl Default for MergeJoinConfig {
    fn default() -> Self {
        Self {
            result_threshold: 0.5,
            result_factor: 3,
        }
    }
}

/// Thresholds driving the hash-vs-merge decision.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Files at or below this size count as small.
    pub small_file: u64,
    /// Files at or above this size count as large.
    pub large_file: u64,
    /// Acceptable ratio between the smaller file and the memory budget when
    /// the inputs are heavily skewed.
    pub file_to_mem: f64,
    /// Ratio between the two files that counts as heavily skewed.
    pub file_to_file: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            small_file: 10 * MEGABYTE,
            large_file: 100 * MEGABYTE,
            file_to_mem: 2.0,
            file_to_file: 5.0,
        }
    }
}

/// Aggregate configuration handed to every strategy and to the optimizer.
#[derive(Debug, Clone, Default)]
pub struct JoinConfig {
    pub hash: HashJoinConfig,
    pub merge: MergeJoinConfig,
    pub optimizer: OptimizerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = JoinConfig::default();
        assert!(config.hash.build_threshold > 0.0 && config.hash.build_threshold < 1.0);
        assert!(config.hash.result_ratio > 0.0 && config.hash.result_ratio < 1.0);
        assert!(config.merge.result_threshold > 0.0 && config.merge.result_threshold < 1.0);
        assert!(config.optimizer.small_file < config.optimizer.large_file);
    }
}
