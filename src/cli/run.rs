//! Execute a query over files or standard input

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use super::CliError;
use crate::{FilterStats, JsonFilter};

/// Query used when none is given: pass every record through unchanged.
pub const DEFAULT_QUERY: &str = "select * from t";

/// Options for a filter run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Query text
    pub sql: Option<String>,
    /// File holding the query text; takes precedence over `sql`
    pub sql_file: Option<PathBuf>,
    /// NDJSON files read in order; standard input when empty
    pub inputs: Vec<PathBuf>,
    /// Destination for kept records; standard output when unset
    pub output: Option<PathBuf>,
    /// File that per-record errors are appended to; standard error when unset
    pub error_output: Option<PathBuf>,
    /// Only compile the query, don't read any input
    pub syntax_only: bool,
}

impl RunOptions {
    /// Resolves the query text from the file, the inline option, or the default.
    pub fn query(&self) -> Result<String, CliError> {
        if let Some(path) = &self.sql_file {
            let text = fs::read_to_string(path).map_err(|source| CliError::Open {
                path: path.clone(),
                source,
            })?;
            return Ok(text.trim().to_string());
        }
        Ok(self
            .sql
            .clone()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string()))
    }
}

/// Result of a run
#[derive(Debug)]
pub enum RunOutcome {
    /// Query compiled; no input was read
    SyntaxValid,
    /// Input was filtered
    Filtered(FilterStats),
}

fn open_input(path: &Path) -> Result<BufReader<File>, CliError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CliError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn open_output(options: &RunOptions) -> Result<Box<dyn Write>, CliError> {
    match &options.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Open {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn open_errors(options: &RunOptions) -> Result<Box<dyn Write>, CliError> {
    match &options.error_output {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::Open {
                    path: path.clone(),
                    source,
                })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stderr())),
    }
}

/// Execute a filter run
///
/// Files in `inputs` are filtered one after another into the same output, so
/// a file missing its final newline never merges into the next one.
pub fn execute(options: &RunOptions) -> Result<RunOutcome, CliError> {
    let query = options.query()?;
    let filter = JsonFilter::new(&query)?;

    if options.syntax_only {
        return Ok(RunOutcome::SyntaxValid);
    }

    // Open every input up front so a bad path fails before any output is written.
    let inputs = options
        .inputs
        .iter()
        .map(|path| open_input(path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut output = open_output(options)?;
    let mut errors = open_errors(options)?;

    let mut stats = FilterStats::default();
    if inputs.is_empty() {
        stats += filter.run(io::stdin().lock(), &mut output, &mut errors)?;
    } else {
        for input in inputs {
            stats += filter.run(input, &mut output, &mut errors)?;
        }
    }

    info!(
        read = stats.read,
        kept = stats.kept,
        dropped = stats.dropped,
        failed = stats.failed,
        "filter finished"
    );
    Ok(RunOutcome::Filtered(stats))
}
