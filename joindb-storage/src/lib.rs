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

//! Storage layer for JoinDB.
//!
//! ## Module Structure
//!
//! - `block.rs`: lazy block-at-a-time reader over newline-delimited files
//! - `bloom.rs`: fixed and scalable bloom filters guarding disk lookups
//! - `disk_set.rs`: directory-backed overflow set (one marker file per element)
//! - `sort.rs`: in-process, memory-bounded external merge sort
//! - `spill.rs`: capacity-bounded set that spills to disk behind the filter

pub mod block;
pub mod bloom;
pub mod disk_set;
pub mod sort;
pub mod spill;

pub use block::BlockReader;
pub use bloom::{BloomFilter, ScalableBloomFilter};
pub use disk_set::DiskSet;
pub use sort::{external_sort, SortedFile};
pub use spill::SpillableSet;
