//! CLI support for json-filter
//!
//! Wires files and standard streams to a [`JsonFilter`](crate::JsonFilter).
//! Kept separate from `main.rs` so the same run can be driven from tests or
//! embedded in other tools.

mod run;

pub use run::{DEFAULT_QUERY, RunOptions, RunOutcome, execute};

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::CompileError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// The query did not compile
    #[error("{0}")]
    Compile(#[from] CompileError),

    /// A named file could not be opened or created
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading input or writing output failed mid-run
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input files and nothing piped to stdin
    #[error("No input provided. Pass input files or pipe NDJSON to stdin.")]
    NoInput,
}
