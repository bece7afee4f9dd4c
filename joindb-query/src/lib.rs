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

//! Join strategies and the strategy optimizer.
//!
//! ## Module Structure
//!
//! - `strategy.rs`: the [`Strategy`] trait, strategy selection enum, and
//!   the size-reordering helper every entry point runs first
//! - `naive.rs`: unbounded baseline for correctness cross-checks
//! - `hash_join.rs`: bounded build/probe hash join
//! - `merge_join.rs`: external-sort merge join
//! - `optimizer.rs`: cost-based choice between hash and merge

pub mod hash_join;
pub mod merge_join;
pub mod naive;
pub mod optimizer;
pub mod strategy;

pub use hash_join::HashJoin;
pub use merge_join::MergeJoin;
pub use naive::Naive;
pub use optimizer::optimal_strategy;
pub use strategy::{file_size, order_by_size, Strategy, StrategyKind};
