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

//! Directory-backed overflow set.
//!
//! Each stored element is a zero-byte marker file named by the element's
//! decimal representation inside an owned temporary directory. Membership
//! is one filesystem metadata check; enumeration is a directory listing in
//! unspecified order. The directory is removed recursively when the set is
//! dropped, on every exit path.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use joindb_core::Result;

#[derive(Debug)]
pub struct DiskSet {
    dir: TempDir,
    cardinality: u64,
}

impl DiskSet {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
            cardinality: 0,
        })
    }

    fn marker_path(&self, element: u64) -> PathBuf {
        self.dir.path().join(element.to_string())
    }

    /// Add an element by creating its marker file.
    ///
    /// Precondition: the caller guarantees the element is not already
    /// present. No existence check is performed here, so a duplicate add
    /// would double-count the cardinality.
    pub fn add(&mut self, element: u64) -> Result<()> {
        File::create(self.marker_path(element))?;
        self.cardinality += 1;
        Ok(())
    }

    /// One filesystem metadata check; O(1) expected, disk latency.
    pub fn contains(&self, element: u64) -> bool {
        self.marker_path(element).is_file()
    }

    /// Number of elements added.
    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    /// Append every stored element to `out` as decimal lines, writing every
    /// `batch_size` lines to bound buffering. Enumeration order is whatever
    /// the filesystem yields, not insertion order.
    pub fn flush<W: Write>(&self, out: &mut W, batch_size: usize) -> Result<()> {
        let mut buffered = String::new();
        let mut pending = 0usize;

        for entry in std::fs::read_dir(self.dir.path())? {
            let entry = entry?;
            buffered.push_str(&entry.file_name().to_string_lossy());
            buffered.push('\n');
            pending += 1;

            if pending >= batch_size {
                out.write_all(buffered.as_bytes())?;
                buffered.clear();
                pending = 0;
            }
        }

        if !buffered.is_empty() {
            out.write_all(buffered.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_and_contains() {
        let mut set = DiskSet::new().unwrap();
        set.add(42).unwrap();
        set.add(7).unwrap();

        assert!(set.contains(42));
        assert!(set.contains(7));
        assert!(!set.contains(99));
        assert_eq!(set.cardinality(), 2);
    }

    #[test]
    fn test_flush_emits_every_element() {
        let mut set = DiskSet::new().unwrap();
        for i in [5u64, 10, 15, 20, 25] {
            set.add(i).unwrap();
        }

        let mut out = Vec::new();
        set.flush(&mut out, 2).unwrap();

        let flushed: HashSet<u64> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect();
        assert_eq!(flushed, HashSet::from([5, 10, 15, 20, 25]));
    }

    #[test]
    fn test_directory_removed_on_drop() {
        let path;
        {
            let mut set = DiskSet::new().unwrap();
            set.add(1).unwrap();
            path = set.dir.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
