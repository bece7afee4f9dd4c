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

//! JoinDB CLI
//!
//! ## Usage
//!
//! ```bash
//! # Intersect two element files under a 64 MB budget
//! joindb intersect --file-1 a.lst --file-2 b.lst --mem-limit 64
//!
//! # Force a strategy and write the result to a file
//! joindb intersect --file-1 a.lst --file-2 b.lst --strategy merge --output out.lst
//!
//! # Generate a synthetic test corpus
//! joindb generate --output a.lst --count 1000000 --seed 7
//! ```

mod datagen;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use joindb_core::{JoinConfig, JoinError, MAX_FILE_SIZE, MEGABYTE, MIN_MEMORY_BUDGET};
use joindb_query::{optimal_strategy, StrategyKind};

/// Lines written per batch when flushing a result set to a file.
const FLUSH_BATCH: usize = 10_000;

/// JoinDB - memory-bounded set intersection
#[derive(Parser)]
#[command(name = "joindb")]
#[command(about = "Intersect two newline-delimited integer files under a memory budget")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Intersect two element files
    Intersect {
        /// First input file (newline-delimited decimal integers)
        #[arg(long = "file-1")]
        file_1: PathBuf,

        /// Second input file
        #[arg(long = "file-2")]
        file_2: PathBuf,

        /// Memory budget in MB
        #[arg(long, default_value = "1.0")]
        mem_limit: f64,

        /// Write the resulting elements to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the optimizer and force a strategy (naive, hash, merge)
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },

    /// Generate a synthetic element file for testing
    Generate {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of distinct elements to write
        #[arg(short, long)]
        count: u64,

        /// Exclusive upper bound on generated values (default: 2^63 - 1)
        #[arg(long)]
        max_value: Option<u64>,

        /// RNG seed for reproducible corpora
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Pre-flight validation: both files exist and are within the size limit,
/// and the budget clears the floor. Runs before any strategy work.
fn validate_inputs(file_1: &Path, file_2: &Path, mem_limit: u64) -> joindb_core::Result<()> {
    if mem_limit < MIN_MEMORY_BUDGET {
        return Err(JoinError::MemoryTooSmall {
            requested: mem_limit,
            minimum: MIN_MEMORY_BUDGET,
        });
    }

    for path in [file_1, file_2] {
        if !path.is_file() {
            return Err(JoinError::FileNotFound(path.to_path_buf()));
        }
        let size = fs::metadata(path)?.len();
        if size > MAX_FILE_SIZE {
            return Err(JoinError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_FILE_SIZE,
            });
        }
    }
    Ok(())
}

fn run_intersect(
    file_1: &Path,
    file_2: &Path,
    mem_limit_mb: f64,
    output: Option<&Path>,
    forced: Option<StrategyKind>,
) -> Result<()> {
    let mem_limit = (mem_limit_mb * MEGABYTE as f64) as u64;
    validate_inputs(file_1, file_2, mem_limit)?;

    let config = JoinConfig::default();
    let kind = match forced {
        Some(kind) => kind,
        None => optimal_strategy(file_1, file_2, mem_limit, &config.optimizer)?,
    };
    info!(strategy = %kind, mem_limit, "starting intersect");

    let start = Instant::now();
    let result = kind.intersect(file_1, file_2, mem_limit, &config)?;
    let elapsed = start.elapsed();

    println!("{}", result.cardinality());
    println!("elapsed: {:.3}s", elapsed.as_secs_f64());

    if let Some(output) = output {
        result.flush(output, FLUSH_BATCH)?;
        info!(output = %output.display(), "result flushed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Intersect {
            file_1,
            file_2,
            mem_limit,
            output,
            strategy,
        } => run_intersect(&file_1, &file_2, mem_limit, output.as_deref(), strategy),
        Commands::Generate {
            output,
            count,
            max_value,
            seed,
        } => {
            let written = datagen::write_synthetic(&output, count, max_value, seed)?;
            println!("wrote {written} elements to {}", output.display());
            Ok(())
        }
    }
}
