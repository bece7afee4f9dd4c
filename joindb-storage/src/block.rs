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

//! Lazy block-at-a-time reader over newline-delimited element files.
//!
//! The reader yields successive blocks of up to `block_size` parsed
//! elements, so a strategy's resident read buffer is bounded by its block
//! budget rather than the file size. The iterator is finite and not
//! restartable; a fresh [`BlockReader::open`] reopens the file.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::{Path, PathBuf};

use joindb_core::{element_in_domain, JoinError, Result};

/// Cap on the per-block preallocation, so oversized block budgets do not
/// reserve memory the file may never fill.
const MAX_BLOCK_PREALLOC: usize = 1 << 14;

#[derive(Debug)]
pub struct BlockReader {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    block_size: usize,
    line_number: u64,
    done: bool,
}

impl BlockReader {
    /// Open `path` for block-at-a-time reading of `block_size` elements.
    pub fn open(path: &Path, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(JoinError::InvalidArgument(
                "block size must be at least 1".to_string(),
            ));
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => JoinError::FileNotFound(path.to_path_buf()),
            _ => JoinError::Io(e),
        })?;

        Ok(Self {
            lines: BufReader::new(file).lines(),
            path: path.to_path_buf(),
            block_size,
            line_number: 0,
            done: false,
        })
    }

    fn parse_line(&self, line: &str) -> Result<u64> {
        match line.parse::<u64>() {
            Ok(element) if element_in_domain(element) => Ok(element),
            _ => Err(JoinError::ParseError {
                path: self.path.clone(),
                line: self.line_number,
                content: line.to_string(),
            }),
        }
    }
}

impl Iterator for BlockReader {
    type Item = Result<Vec<u64>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut block = Vec::with_capacity(self.block_size.min(MAX_BLOCK_PREALLOC));
        while block.len() < self.block_size {
            match self.lines.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) => {
                    self.line_number += 1;
                    match self.parse_line(&line) {
                        Ok(element) => block.push(element),
                        Err(e) => {
                            self.done = true;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }

        if block.is_empty() {
            None
        } else {
            Some(Ok(block))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_lines(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_in_blocks() {
        let file = write_lines(&["1", "2", "3", "4", "5"]);
        let blocks: Vec<Vec<u64>> = BlockReader::open(file.path(), 2)
            .unwrap()
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(blocks, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        let file = write_lines(&[]);
        let mut reader = BlockReader::open(file.path(), 4).unwrap();
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let file = write_lines(&["1"]);
        let err = BlockReader::open(file.path(), 0).unwrap_err();
        assert!(matches!(err, JoinError::InvalidArgument(_)));
    }

    #[test]
    fn test_reader_is_debuggable() {
        // Callers (and assertions on Result<BlockReader>) rely on Debug.
        let file = write_lines(&["1"]);
        let reader = BlockReader::open(file.path(), 4).unwrap();
        let repr = format!("{reader:?}");
        assert!(repr.contains("BlockReader"));
    }

    #[test]
    fn test_missing_file_reported() {
        let err = BlockReader::open(Path::new("/no/such/file.lst"), 4).unwrap_err();
        assert!(matches!(err, JoinError::FileNotFound(_)));
    }

    #[test]
    fn test_malformed_line_is_parse_error() {
        let file = write_lines(&["1", "banana", "3"]);
        let mut reader = BlockReader::open(file.path(), 10).unwrap();
        let err = reader.next().unwrap().unwrap_err();
        match err {
            JoinError::ParseError { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "banana");
            }
            other => panic!("unexpected error: {other}"),
        }
        // A parse error terminates the sequence.
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_out_of_domain_value_is_parse_error() {
        // 2^63 is one past the largest legal element.
        let file = write_lines(&["9223372036854775808"]);
        let mut reader = BlockReader::open(file.path(), 10).unwrap();
        assert!(matches!(
            reader.next().unwrap().unwrap_err(),
            JoinError::ParseError { .. }
        ));
    }

    #[test]
    fn test_negative_value_is_parse_error() {
        let file = write_lines(&["-5"]);
        let mut reader = BlockReader::open(file.path(), 10).unwrap();
        assert!(matches!(
            reader.next().unwrap().unwrap_err(),
            JoinError::ParseError { .. }
        ));
    }
}
