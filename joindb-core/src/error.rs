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

//! Error types for JoinDB.
//!
//! No error is retried anywhere in the engine; every failure aborts the
//! current intersect call and propagates to the caller. A failed strategy
//! yields no result set.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("file too large: {} is {size} bytes (limit {limit})", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("memory limit too small: {requested} bytes (minimum {minimum})")]
    MemoryTooSmall { requested: u64, minimum: u64 },

    #[error("element {0} is outside the supported domain [0, 2^63)")]
    InvalidElement(u64),

    #[error("parse error in {} at line {line}: {content:?} is not a valid element", .path.display())]
    ParseError {
        path: PathBuf,
        line: u64,
        content: String,
    },

    #[error("external sort failed: {0}")]
    SortFailed(String),
}

pub type Result<T> = std::result::Result<T, JoinError>;
