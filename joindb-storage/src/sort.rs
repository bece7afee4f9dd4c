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

//! In-process, memory-bounded external merge sort.
//!
//! Produces a numerically ascending, duplicate-free copy of an element file
//! while keeping the working set under the caller's memory hint. Two
//! phases:
//!
//! 1. **Run generation**: read the input in blocks sized by the hint, sort
//!    and dedup each block in memory, write each as a sorted run file.
//! 2. **K-way merge**: merge all runs through a min-heap, dropping
//!    duplicates across runs, into the final output file.
//!
//! A single-run input skips the merge entirely. All run files and the
//! output are owned temporary files, deleted on drop.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use joindb_core::{JoinError, Result, ELEMENT_COST};

use crate::block::BlockReader;

/// Sorted, duplicate-free temporary file produced by [`external_sort`].
///
/// The backing file is deleted when this handle is dropped.
#[derive(Debug)]
pub struct SortedFile {
    file: NamedTempFile,
}

impl SortedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// One open run in the merge phase: the head element plus the rest of the
/// run's lines.
struct RunCursor {
    head: Option<u64>,
    lines: Lines<BufReader<File>>,
}

impl RunCursor {
    fn open(path: &Path) -> Result<Self> {
        let lines = BufReader::new(File::open(path)?).lines();
        let mut cursor = Self { head: None, lines };
        cursor.advance()?;
        Ok(cursor)
    }

    /// Replace the head with the run's next element, or None at end.
    fn advance(&mut self) -> Result<()> {
        self.head = match self.lines.next() {
            None => None,
            Some(line) => {
                let line = line.map_err(|e| JoinError::SortFailed(e.to_string()))?;
                Some(line.parse::<u64>().map_err(|_| {
                    JoinError::SortFailed(format!("corrupt run file entry: {line:?}"))
                })?)
            }
        };
        Ok(())
    }
}

/// Sort `path` into a new temporary file: numerically ascending,
/// duplicates eliminated, working memory bounded by `memory_hint` bytes.
pub fn external_sort(path: &Path, memory_hint: u64) -> Result<SortedFile> {
    // Elements that fit in the hint; one block becomes one sorted run.
    let run_capacity = (memory_hint / ELEMENT_COST).max(1) as usize;

    let mut runs: Vec<NamedTempFile> = Vec::new();
    for block in BlockReader::open(path, run_capacity)? {
        let mut elements = block?;
        elements.sort_unstable();
        elements.dedup();
        runs.push(write_run(&elements)?);
    }

    debug!(
        input = %path.display(),
        runs = runs.len(),
        run_capacity,
        "external sort run generation complete"
    );

    match runs.len() {
        // Empty input still yields an (empty) sorted file.
        0 => Ok(SortedFile {
            file: NamedTempFile::new()?,
        }),
        1 => Ok(SortedFile {
            file: runs.remove(0),
        }),
        _ => merge_runs(&runs),
    }
}

fn write_run(elements: &[u64]) -> Result<NamedTempFile> {
    let mut run = NamedTempFile::new()?;
    {
        let mut out = BufWriter::new(run.as_file_mut());
        for element in elements {
            writeln!(out, "{element}")?;
        }
        out.flush()?;
    }
    Ok(run)
}

/// Merge sorted, internally duplicate-free runs into one output file,
/// dropping duplicates that appear across runs.
fn merge_runs(runs: &[NamedTempFile]) -> Result<SortedFile> {
    let mut cursors = Vec::with_capacity(runs.len());
    for run in runs {
        cursors.push(RunCursor::open(run.path())?);
    }

    // Min-heap over (head, run index).
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
    for (idx, cursor) in cursors.iter().enumerate() {
        if let Some(head) = cursor.head {
            heap.push(Reverse((head, idx)));
        }
    }

    let mut output = NamedTempFile::new()?;
    {
        let mut out = BufWriter::new(output.as_file_mut());
        let mut last_written: Option<u64> = None;

        while let Some(Reverse((value, idx))) = heap.pop() {
            if last_written != Some(value) {
                writeln!(out, "{value}")?;
                last_written = Some(value);
            }
            cursors[idx].advance()?;
            if let Some(head) = cursors[idx].head {
                heap.push(Reverse((head, idx)));
            }
        }
        out.flush()?;
    }

    Ok(SortedFile { file: output })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_elements(elements: &[u64]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for e in elements {
            writeln!(file, "{e}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn read_sorted(sorted: &SortedFile) -> Vec<u64> {
        std::fs::read_to_string(sorted.path())
            .unwrap()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect()
    }

    #[test]
    fn test_sorts_and_dedups_single_run() {
        let input = write_elements(&[5, 3, 3, 1]);
        let sorted = external_sort(input.path(), 1 << 20).unwrap();
        assert_eq!(read_sorted(&sorted), vec![1, 3, 5]);
    }

    #[test]
    fn test_sorts_across_multiple_runs() {
        // Hint of 64 bytes forces 4-element runs.
        let input = write_elements(&[9, 1, 8, 2, 7, 3, 6, 4, 5, 0]);
        let sorted = external_sort(input.path(), 64).unwrap();
        assert_eq!(read_sorted(&sorted), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_dedups_across_runs() {
        let input = write_elements(&[4, 2, 4, 2, 4, 2, 4, 2]);
        let sorted = external_sort(input.path(), 32).unwrap();
        assert_eq!(read_sorted(&sorted), vec![2, 4]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let input = write_elements(&[]);
        let sorted = external_sort(input.path(), 1 << 20).unwrap();
        assert_eq!(read_sorted(&sorted), Vec::<u64>::new());
    }

    #[test]
    fn test_output_deleted_on_drop() {
        let input = write_elements(&[3, 1, 2]);
        let path;
        {
            let sorted = external_sort(input.path(), 1 << 20).unwrap();
            path = sorted.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_error_propagates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1\nnope\n3").unwrap();
        file.flush().unwrap();
        let err = external_sort(file.path(), 1 << 20).unwrap_err();
        assert!(matches!(err, JoinError::ParseError { .. }));
    }
}
