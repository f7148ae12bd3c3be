//! oxide-changeset CLI
//!
//! Compiles a JSON change-set into a SQL Server `sp_executesql` batch.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_changeset::prelude::*;

/// Compile tracked entity changes into SQL Server batches.
#[derive(Parser)]
#[command(name = "oxide-changeset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a change-set file into a batch.
    Generate {
        /// JSON array of mutation records (`-` for stdin).
        #[arg(short, long)]
        input: PathBuf,

        /// Write the batch here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with generator options.
        #[arg(long, env = "OXIDE_CHANGESET_OPTIONS")]
        options: Option<PathBuf>,

        /// Put each statement on its own line.
        #[arg(long)]
        statement_per_line: bool,

        /// Fail on unrecognized SQL type names.
        #[arg(long)]
        strict_types: bool,

        /// Emit quotes inside values unescaped.
        #[arg(long)]
        no_escape_quotes: bool,

        /// Flush output after every statement.
        #[arg(long)]
        flush_each_statement: bool,
    },

    /// Show how SQL type names are classified.
    Classify {
        /// Type names, e.g. `nvarchar(50)`.
        #[arg(required = true)]
        sql_types: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only SQL.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            options,
            statement_per_line,
            strict_types,
            no_escape_quotes,
            flush_each_statement,
        } => {
            let mut generator_options = match options {
                Some(path) => GeneratorOptions::from_path(&path)
                    .with_context(|| format!("Failed to load options from {}", path.display()))?,
                None => GeneratorOptions::default(),
            };
            if statement_per_line {
                generator_options.statement_per_line = true;
            }
            if strict_types {
                generator_options.strict_types = true;
            }
            if no_escape_quotes {
                generator_options.escape_quotes = false;
            }
            if flush_each_statement {
                generator_options.flush_each_statement = true;
            }

            let records = read_records(&input)?;
            info!(records = records.len(), "Loaded change-set");

            let generator = BatchGenerator::with_options(generator_options);
            let summary = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    generator.write_to(&records, file)?
                }
                None => {
                    let summary = generator.write_to(&records, io::stdout().lock())?;
                    if !generator.options().statement_per_line {
                        writeln!(io::stdout())?;
                    }
                    summary
                }
            };

            info!(
                inserts = summary.inserts,
                updates = summary.updates,
                deletes = summary.deletes,
                skipped = summary.skipped,
                "Done"
            );
        }

        Commands::Classify { sql_types } => {
            let mut stdout = io::stdout().lock();
            for sql_type in &sql_types {
                writeln!(stdout, "{sql_type}\t{}", classify(sql_type))?;
            }
        }
    }

    Ok(())
}

fn read_records(input: &Path) -> anyhow::Result<Vec<MutationRecord>> {
    let json = if input == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };
    serde_json::from_str(&json).context("Invalid change-set JSON")
}
