use clap::Parser as ClapParser;
use json_filter::cli::{self, CliError, RunOptions, RunOutcome};
use std::{io, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "json-filter")]
#[command(about = "Filter newline-delimited JSON with a SQL-like query")]
#[command(version)]
struct Cli {
    /// Query to run, e.g. "select name from t where age > 18"
    #[arg(short = 'q', long, conflicts_with = "sql_file")]
    sql: Option<String>,

    /// Read the query from a file
    #[arg(short = 'f', long)]
    sql_file: Option<PathBuf>,

    /// Write kept records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append per-record errors here instead of stderr
    #[arg(long)]
    error_output: Option<PathBuf>,

    /// Only validate the query, don't read input
    #[arg(long)]
    syntax_only: bool,

    /// NDJSON input files (reads from stdin if none are given)
    files: Vec<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let options = RunOptions {
        sql: cli.sql,
        sql_file: cli.sql_file,
        inputs: cli.files,
        output: cli.output,
        error_output: cli.error_output,
        syntax_only: cli.syntax_only,
    };

    if !options.syntax_only && options.inputs.is_empty() && atty::is(atty::Stream::Stdin) {
        return Err(CliError::NoInput);
    }

    match cli::execute(&options)? {
        RunOutcome::SyntaxValid => println!("Syntax is valid"),
        RunOutcome::Filtered(stats) if stats.failed > 0 => {
            tracing::warn!(failed = stats.failed, "some records could not be processed");
        }
        RunOutcome::Filtered(_) => {}
    }
    Ok(())
}
