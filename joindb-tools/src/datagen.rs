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

//! Synthetic test-data generation.
//!
//! Samples `count` distinct elements uniformly from `[0, max_value)`
//! without replacement and writes them one per line, satisfying the
//! engine's duplicate-free input contract. Seeded runs are reproducible,
//! which keeps large test corpora out of version control.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use joindb_core::{JoinError, Result, MAX_ELEMENT};

/// Write `count` distinct random elements to `output`. Returns the number
/// of elements written.
pub fn write_synthetic(
    output: &Path,
    count: u64,
    max_value: Option<u64>,
    seed: Option<u64>,
) -> Result<u64> {
    let max_value = max_value.unwrap_or(MAX_ELEMENT - 1).min(MAX_ELEMENT - 1);
    if count > max_value {
        return Err(JoinError::InvalidArgument(format!(
            "cannot draw {count} distinct values from [0, {max_value})"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Rejection sampling; fine while count stays well below max_value.
    let mut seen: HashSet<u64> = HashSet::with_capacity(count as usize);
    let mut out = BufWriter::new(File::create(output)?);
    while (seen.len() as u64) < count {
        let value = rng.gen_range(0..max_value);
        if seen.insert(value) {
            writeln!(out, "{value}")?;
        }
    }
    out.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read_elements(path: &Path) -> Vec<u64> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect()
    }

    #[test]
    fn test_writes_requested_count_without_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("synthetic.lst");
        write_synthetic(&path, 500, Some(10_000), Some(1)).unwrap();

        let elements = read_elements(&path);
        assert_eq!(elements.len(), 500);
        let distinct: HashSet<u64> = elements.iter().copied().collect();
        assert_eq!(distinct.len(), 500);
        assert!(elements.iter().all(|&e| e < 10_000));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.lst");
        let b = dir.path().join("b.lst");
        write_synthetic(&a, 100, Some(1_000_000), Some(42)).unwrap();
        write_synthetic(&b, 100, Some(1_000_000), Some(42)).unwrap();

        assert_eq!(read_elements(&a), read_elements(&b));
    }

    #[test]
    fn test_impossible_request_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("too-many.lst");
        let err = write_synthetic(&path, 100, Some(10), None).unwrap_err();
        assert!(matches!(err, JoinError::InvalidArgument(_)));
    }
}
