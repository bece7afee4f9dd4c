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

//! Bloom filters for fast negative lookups on the spill path.
//!
//! A spilled element lives as a marker file on disk, so every membership
//! probe against the overflow tier is a filesystem metadata call. The
//! filter sits in front of that tier: a miss here is conclusive (no false
//! negatives) and skips the disk entirely; a hit still requires the
//! authoritative disk check because the filter may false-positive.
//!
//! Uses xxHash-based double hashing: h_i(x) = h1(x) + i * h2(x), which is
//! equivalent to k independent hash functions (Kirsch & Mitzenmacher,
//! "Less Hashing, Same Performance", 2008).

use std::hash::Hasher;
use twox_hash::XxHash64;

/// Seed separating the two base hash functions.
const H2_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Fixed-capacity bloom filter over the element domain.
#[derive(Debug)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: usize,
    num_hashes: usize,
}

impl BloomFilter {
    /// Create a filter sized for `expected_items` insertions at the given
    /// false positive rate (e.g. 0.001 for 0.1%).
    pub fn new(expected_items: usize, false_positive_rate: f64) -> Self {
        let num_bits = Self::optimal_num_bits(expected_items, false_positive_rate);
        let num_hashes = Self::optimal_num_hashes(expected_items, num_bits);

        let num_words = num_bits.div_ceil(64);
        Self {
            bits: vec![0u64; num_words],
            num_bits,
            num_hashes,
        }
    }

    /// Optimal number of bits: m = -n ln(p) / (ln 2)^2.
    fn optimal_num_bits(n: usize, p: f64) -> usize {
        let m = -(n.max(1) as f64 * p.ln()) / (2.0_f64.ln().powi(2));
        (m.ceil() as usize).max(64)
    }

    /// Optimal number of hash functions: k = (m / n) ln 2.
    fn optimal_num_hashes(n: usize, m: usize) -> usize {
        let k = (m as f64 / n.max(1) as f64) * 2.0_f64.ln();
        (k.ceil() as usize).max(1)
    }

    /// Insert an element.
    pub fn insert(&mut self, element: u64) {
        let (h1, h2) = Self::base_hashes(element);
        for i in 0..self.num_hashes {
            let bit_index = Self::hash(h1, h2, i) % self.num_bits;
            let word_index = bit_index / 64;
            let bit_offset = bit_index % 64;

            debug_assert!(
                word_index < self.bits.len(),
                "bloom filter index out of bounds: {} >= {}",
                word_index,
                self.bits.len()
            );

            self.bits[word_index] |= 1u64 << bit_offset;
        }
    }

    /// Check whether an element might be present.
    ///
    /// Returns true if the element *might* be present (could be a false
    /// positive); false means the element is *definitely not* present.
    pub fn contains(&self, element: u64) -> bool {
        let (h1, h2) = Self::base_hashes(element);
        for i in 0..self.num_hashes {
            let bit_index = Self::hash(h1, h2, i) % self.num_bits;
            let word_index = bit_index / 64;
            let bit_offset = bit_index % 64;

            if (self.bits[word_index] & (1u64 << bit_offset)) == 0 {
                return false;
            }
        }
        true
    }

    /// Two independent base hashes of the element.
    fn base_hashes(element: u64) -> (u64, u64) {
        let mut h1 = XxHash64::with_seed(0);
        h1.write(&element.to_le_bytes());
        let mut h2 = XxHash64::with_seed(H2_SEED);
        h2.write(&element.to_le_bytes());
        (h1.finish(), h2.finish())
    }

    /// Double hashing: h_i(x) = h1(x) + i * h2(x) mod m.
    fn hash(h1: u64, h2: u64, index: usize) -> usize {
        h1.wrapping_add((index as u64).wrapping_mul(h2)) as usize
    }

    /// Size of the filter in bytes (bit vector plus metadata).
    pub fn size_bytes(&self) -> usize {
        24 + self.bits.len() * 8
    }
}

/// Default per-filter base error rate for [`ScalableBloomFilter`].
const BASE_ERROR_RATE: f64 = 0.001;

/// Capacity of the first internal filter.
const INITIAL_CAPACITY: usize = 1024;

/// Capacity multiplier between successive internal filters.
const GROWTH_FACTOR: usize = 2;

/// Error-rate tightening ratio between successive internal filters, which
/// keeps the compound false positive rate bounded as the filter grows.
const TIGHTENING_RATIO: f64 = 0.9;

/// Bloom filter that grows with its input.
///
/// The spill path cannot know its final cardinality in advance, so a fixed
/// filter would either waste memory or saturate. This stacks fixed filters
/// with geometrically growing capacity and tightening error rates; lookups
/// consult every layer, so the no-false-negative guarantee is preserved
/// across growth.
#[derive(Debug)]
pub struct ScalableBloomFilter {
    filters: Vec<BloomFilter>,
    /// Insertions into the newest filter.
    current_count: usize,
    /// Capacity of the newest filter.
    current_capacity: usize,
    /// Error rate of the newest filter.
    current_error: f64,
    len: usize,
}

impl ScalableBloomFilter {
    pub fn new() -> Self {
        Self {
            filters: vec![BloomFilter::new(INITIAL_CAPACITY, BASE_ERROR_RATE)],
            current_count: 0,
            current_capacity: INITIAL_CAPACITY,
            current_error: BASE_ERROR_RATE,
            len: 0,
        }
    }

    /// Insert an element, growing a new layer when the newest filter is at
    /// capacity. Returns false if the element was already (possibly) present.
    pub fn insert(&mut self, element: u64) -> bool {
        if self.contains(element) {
            return false;
        }

        if self.current_count >= self.current_capacity {
            self.current_capacity *= GROWTH_FACTOR;
            self.current_error *= TIGHTENING_RATIO;
            self.current_count = 0;
            self.filters
                .push(BloomFilter::new(self.current_capacity, self.current_error));
        }

        // Only the newest filter accepts writes; older layers are frozen.
        if let Some(newest) = self.filters.last_mut() {
            newest.insert(element);
        }
        self.current_count += 1;
        self.len += 1;
        true
    }

    /// Check whether an element might be present in any layer.
    pub fn contains(&self, element: u64) -> bool {
        self.filters.iter().any(|f| f.contains(element))
    }

    /// Number of distinct elements inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total memory held by all layers, in bytes.
    pub fn memory_size(&self) -> usize {
        self.filters.iter().map(BloomFilter::size_bytes).sum()
    }
}

impl Default for ScalableBloomFilter {
    fn default() -> Self {
        Self::new()
    }
}
