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

//! Capacity-bounded set that spills to disk.
//!
//! Elements live in an in-memory hash set until `capacity` of them are
//! resident; beyond that, inserts are routed to the [`DiskSet`] guarded by
//! a scalable bloom filter. The filter's no-false-negative guarantee makes
//! a filter miss a conclusive absence, so most probes for absent elements
//! never touch the disk tier.
//!
//! Invariant: `cardinality == |memory subset| + |disk subset|`, and the two
//! subsets are disjoint.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use joindb_core::{element_in_domain, JoinError, Result, ELEMENT_COST};

use crate::bloom::ScalableBloomFilter;
use crate::disk_set::DiskSet;

#[derive(Debug)]
pub struct SpillableSet {
    capacity: u64,
    cardinality: u64,
    mem: HashSet<u64>,
    bloom: ScalableBloomFilter,
    disk: DiskSet,
}

impl SpillableSet {
    /// Create a set that keeps at most `capacity` elements in memory.
    ///
    /// The disk tier's temporary directory is created eagerly so that a
    /// failure surfaces at construction rather than mid-insert.
    pub fn with_capacity(capacity: u64) -> Result<Self> {
        Ok(Self {
            capacity,
            cardinality: 0,
            mem: HashSet::new(),
            bloom: ScalableBloomFilter::new(),
            disk: DiskSet::new()?,
        })
    }

    /// Create a set that never spills. Baseline use only.
    pub fn unbounded() -> Result<Self> {
        Self::with_capacity(u64::MAX)
    }

    fn mem_full(&self) -> bool {
        self.cardinality >= self.capacity
    }

    /// Count of logically distinct elements ever added.
    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    /// Maximum elements retained in memory before spilling begins.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes of this set's budget that are still unused, given the
    /// per-element cost constant. Zero once memory is full.
    pub fn available_memory(&self) -> u64 {
        if self.mem_full() {
            return 0;
        }
        (self.capacity - self.cardinality).saturating_mul(ELEMENT_COST)
    }

    /// Lower the in-memory ceiling by `elements`. Used to hand unused build
    /// budget to another set; the freed headroom must not be reclaimed here
    /// afterwards.
    pub fn shrink_capacity(&mut self, elements: u64) {
        self.capacity = self.capacity.saturating_sub(elements);
    }

    /// Add an element, spilling to disk once memory is at capacity.
    ///
    /// Idempotent for memory-resident elements. On the spill path the
    /// element goes straight into the filter and the disk set without a
    /// disk existence check: each upstream element stream is duplicate-free
    /// by contract, so a re-check would only add a metadata round trip.
    pub fn add(&mut self, element: u64) -> Result<u64> {
        if !element_in_domain(element) {
            return Err(JoinError::InvalidElement(element));
        }

        if self.mem.contains(&element) {
            return Ok(element);
        }

        if !self.mem_full() {
            self.mem.insert(element);
            self.cardinality += 1;
            return Ok(element);
        }

        if self.disk.cardinality() == 0 {
            debug!(
                capacity = self.capacity,
                filter_bytes = self.bloom.memory_size(),
                "memory capacity reached, spilling to disk"
            );
        }

        self.bloom.insert(element);
        self.disk.add(element)?;
        self.cardinality += 1;
        Ok(element)
    }

    /// Membership test across both tiers.
    ///
    /// While memory is not yet full every inserted element is still
    /// resident, so a memory miss is conclusive. Once full, a filter miss
    /// is conclusive (no false negatives); a filter hit is confirmed
    /// against the disk set, whose answer is authoritative.
    pub fn contains(&self, element: u64) -> Result<bool> {
        if !element_in_domain(element) {
            return Err(JoinError::InvalidElement(element));
        }

        if self.mem.contains(&element) {
            return Ok(true);
        }
        if !self.mem_full() {
            return Ok(false);
        }
        if !self.bloom.contains(element) {
            return Ok(false);
        }
        Ok(self.disk.contains(element))
    }

    /// Append every element to `output` as decimal lines, memory tier first
    /// then disk tier, writing every `batch_size` lines. Repeated calls
    /// append duplicate content.
    pub fn flush(&self, output: &Path, batch_size: usize) -> Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(output)?;
        let mut out = BufWriter::new(file);

        let mut buffered = String::new();
        let mut pending = 0usize;
        for element in &self.mem {
            buffered.push_str(&element.to_string());
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

        self.disk.flush(&mut out, batch_size)?;
        out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn resident_count(&self) -> usize {
        self.mem.len()
    }

    #[cfg(test)]
    fn spilled_count(&self) -> u64 {
        self.disk.cardinality()
    }
}
