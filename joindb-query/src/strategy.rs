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

//! The strategy seam: a trait with one required method, plus the explicit
//! size-reordering helper called at the top of every strategy and optimizer
//! entry point. Cost formulas throughout assume "file1 is the smaller
//! operand"; the helper makes that contract visible at each call site
//! instead of hiding it behind a wrapper.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use joindb_core::{JoinConfig, JoinError, Result};
use joindb_storage::SpillableSet;

use crate::{HashJoin, MergeJoin, Naive};

/// A join strategy: consumes two element files and a memory budget,
/// produces the intersection as a [`SpillableSet`].
pub trait Strategy {
    fn intersect(
        &self,
        file1: &Path,
        file2: &Path,
        mem_limit: u64,
        config: &JoinConfig,
    ) -> Result<SpillableSet>;
}

/// Byte size of `path`, with a missing file reported as such.
pub fn file_size(path: &Path) -> Result<u64> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(JoinError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(JoinError::Io(e)),
    }
}

/// Reorder two files so the smaller comes first, returning both sizes.
///
/// Ties keep the caller's order.
pub fn order_by_size<'a>(file1: &'a Path, file2: &'a Path) -> Result<(&'a Path, &'a Path, u64, u64)> {
    let size1 = file_size(file1)?;
    let size2 = file_size(file2)?;

    if size2 < size1 {
        Ok((file2, file1, size2, size1))
    } else {
        Ok((file1, file2, size1, size2))
    }
}

/// Tag identifying a concrete strategy, as returned by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Naive,
    Hash,
    Merge,
}

impl StrategyKind {
    /// Materialize the strategy behind the tag.
    pub fn instance(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Naive => Box::new(Naive),
            StrategyKind::Hash => Box::new(HashJoin),
            StrategyKind::Merge => Box::new(MergeJoin),
        }
    }

    /// Run the tagged strategy directly.
    pub fn intersect(
        self,
        file1: &Path,
        file2: &Path,
        mem_limit: u64,
        config: &JoinConfig,
    ) -> Result<SpillableSet> {
        self.instance().intersect(file1, file2, mem_limit, config)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Naive => write!(f, "naive"),
            StrategyKind::Hash => write!(f, "hash"),
            StrategyKind::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "naive" => Ok(StrategyKind::Naive),
            "hash" => Ok(StrategyKind::Hash),
            "merge" => Ok(StrategyKind::Merge),
            other => Err(JoinError::InvalidArgument(format!(
                "unknown strategy {other:?} (expected naive, hash, or merge)"
            ))),
        }
    }
}
