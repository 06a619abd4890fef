mod console;
mod generate;
mod init;
mod report;
mod show;

use anyhow::Context;
use campus_console::config::AppConfig;
use campus_console::db::Database;
use campus_console::error::Error;
use campus_console::logging;
use campus_console::output::OutputFormat;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campus-console")]
#[command(version)]
#[command(
    about = "Console front-end for the student, professor, course, task and registration schema",
    long_about = None
)]
pub struct Cli {
    /// YAML configuration file (default: <config dir>/campus-console/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file, or :memory: (overrides config and CAMPUS_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive numbered menu (default)
    Console {
        /// Seed for data generated from the menu
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Create the campus tables
    Init {
        /// Drop existing campus tables first
        #[arg(long)]
        reset: bool,
    },

    /// List tables with their row counts
    Tables,

    /// Print the rows of a table
    Show {
        /// Table name (Student, Professor, Course, Task, Registration)
        table: String,

        /// Maximum rows to print (default: console.select_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, json, csv
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Generate synthetic rows, parents before children
    Generate {
        /// Rows per table
        #[arg(short, long)]
        count: usize,

        /// Only these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tables: Option<Vec<String>>,

        /// Random seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,

        /// Hide the per-table progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// Run one of the analytical queries with execution timing
    Report {
        #[command(subcommand)]
        query: ReportQuery,

        /// Print the analyzed plan
        #[arg(long, global = true)]
        plan: bool,

        /// Output format: table, json, csv
        #[arg(short, long, global = true)]
        format: Option<OutputFormat>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ReportQuery {
    /// Tasks per student and course for names containing PATTERN
    StudentTasks { pattern: String },

    /// Distinct courses per professor with at least MIN years of experience
    ProfessorCourses {
        #[arg(allow_hyphen_values = true)]
        min_experience: String,
    },

    /// Registrations per course between START and END (inclusive)
    CourseRegistrations { start: String, end: String },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        generate(
            shell,
            &mut Cli::command(),
            "campus-console",
            &mut io::stdout(),
        );
        return Ok(());
    }

    let config = AppConfig::resolve(cli.config.as_deref(), cli.db, cli.log_level)?;
    let level = logging::parse_level(&config.log_level)
        .map_err(|e| Error::Connection(format!("invalid configuration: {}", e)))?;
    logging::init(level);

    let db = Database::open(&config.database)?;

    let result = match cli.command.unwrap_or(Commands::Console { seed: None }) {
        Commands::Console { seed } => console::run(&db, &config, seed),
        Commands::Init { reset } => init::run(&db, reset),
        Commands::Tables => show::tables(&db),
        Commands::Show {
            table,
            limit,
            format,
        } => show::run(
            &db,
            &table,
            limit.unwrap_or(config.console.select_limit),
            format.unwrap_or(config.format),
        ),
        Commands::Generate {
            count,
            tables,
            seed,
            no_progress,
        } => generate::run(&db, count, tables, seed, !no_progress),
        Commands::Report {
            query,
            plan,
            format,
        } => report::run(&db, query, plan, format.unwrap_or(config.format)),
        Commands::Completions { .. } => Ok(()),
    };

    let closed = db.close().context("Failed to close database");
    finish(result, closed)
}

/// The command's own error wins over a failure to close
fn finish(result: anyhow::Result<()>, closed: anyhow::Result<()>) -> anyhow::Result<()> {
    result.and(closed)
}
