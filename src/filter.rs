//! The per-record decision loop.
//!
//! Each input line is parsed into a [`Record`], the compiled predicate decides
//! whether to keep it, and kept records are projected onto the selected
//! fields. A record that fails is reported and skipped; the stream goes on.

use std::{
    io::{self, BufRead, Write},
    ops::AddAssign,
    str::{self, Utf8Error},
};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::QueryPlan,
    compiler::{CompileError, compile},
    evaluator::EvalError,
    record::Record,
};

/// A single input line could not be processed.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: invalid UTF-8: {source}")]
    Utf8 {
        line: usize,
        #[source]
        source: Utf8Error,
    },

    #[error("line {line}: {source}")]
    Eval {
        line: usize,
        #[source]
        source: EvalError,
    },
}

impl RecordError {
    /// 1-based number of the offending input line.
    pub fn line(&self) -> usize {
        match self {
            RecordError::Json { line, .. }
            | RecordError::Utf8 { line, .. }
            | RecordError::Eval { line, .. } => *line,
        }
    }
}

/// Counters for one run over an input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Non-blank lines read
    pub read: usize,
    /// Records written to the output
    pub kept: usize,
    /// Records the predicate rejected
    pub dropped: usize,
    /// Records reported to the error channel
    pub failed: usize,
}

impl AddAssign for FilterStats {
    fn add_assign(&mut self, other: Self) {
        self.read += other.read;
        self.kept += other.kept;
        self.dropped += other.dropped;
        self.failed += other.failed;
    }
}

/// A compiled query ready to filter records.
///
/// # Examples
///
/// ```
/// use json_filter::JsonFilter;
///
/// let filter = JsonFilter::new("select name from t where age > 18").unwrap();
///
/// let input = "{\"name\":\"Alice\",\"age\":20}\n{\"name\":\"Bob\",\"age\":15}\n";
/// let mut output = Vec::new();
/// let mut errors = Vec::new();
/// let stats = filter.run(input.as_bytes(), &mut output, &mut errors).unwrap();
///
/// assert_eq!(String::from_utf8(output).unwrap(), "{\"name\":\"Alice\"}\n");
/// assert_eq!(stats.kept, 1);
/// assert_eq!(stats.dropped, 1);
/// ```
#[derive(Debug, Clone)]
pub struct JsonFilter {
    plan: QueryPlan,
}

impl JsonFilter {
    pub fn new(query: &str) -> Result<Self, CompileError> {
        Ok(JsonFilter {
            plan: compile(query)?,
        })
    }

    pub fn from_plan(plan: QueryPlan) -> Self {
        JsonFilter { plan }
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Evaluates the predicate against one record.
    pub fn decide(&self, record: &Record<'_>) -> Result<bool, EvalError> {
        self.plan.predicate.as_bool(record)
    }

    /// Renders a kept record: verbatim for `select *`, otherwise the
    /// projected object as compact JSON with sorted keys.
    pub fn render(&self, record: &Record<'_>) -> Result<String, EvalError> {
        if self.plan.selects_all() {
            return Ok(record.raw().to_string());
        }
        Ok(record.project(&self.plan.fields)?.to_string())
    }

    /// Processes one input line (`line_no` is 1-based, used in errors).
    ///
    /// Returns `Ok(Some(output))` for a kept record and `Ok(None)` for a
    /// dropped one.
    pub fn apply(&self, line_no: usize, line: &str) -> Result<Option<String>, RecordError> {
        let record = Record::parse(line).map_err(|source| RecordError::Json {
            line: line_no,
            source,
        })?;
        let eval_err = |source| RecordError::Eval {
            line: line_no,
            source,
        };

        if !self.decide(&record).map_err(eval_err)? {
            return Ok(None);
        }
        self.render(&record).map(Some).map_err(eval_err)
    }

    /// Filters every line of `input` into `output`.
    ///
    /// Blank lines are skipped. Per-record failures, including lines that are
    /// not valid UTF-8, are written to `errors`, one per line, and do not stop
    /// the run; I/O failures do.
    pub fn run<R, W, E>(
        &self,
        mut input: R,
        mut output: W,
        mut errors: E,
    ) -> io::Result<FilterStats>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let mut stats = FilterStats::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let outcome = match str::from_utf8(trim_line_ending(&buf)) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.apply(line_no, line),
                Err(source) => Err(RecordError::Utf8 {
                    line: line_no,
                    source,
                }),
            };
            stats.read += 1;

            match outcome {
                Ok(Some(rendered)) => {
                    writeln!(output, "{}", rendered)?;
                    stats.kept += 1;
                }
                Ok(None) => {
                    debug!(line = line_no, "record dropped");
                    stats.dropped += 1;
                }
                Err(e) => {
                    debug!(line = line_no, error = %e, "record skipped");
                    writeln!(errors, "check line error: {}", e)?;
                    stats.failed += 1;
                }
            }
        }

        output.flush()?;
        errors.flush()?;
        Ok(stats)
    }
}

/// Strips a trailing `\n` or `\r\n`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
