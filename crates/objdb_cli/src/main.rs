//! objdb contact book
//!
//! A small address book kept in any objdb backend.
//!
//! # Commands
//!
//! - `add` - Add a contact
//! - `list` - List contacts, optionally filtered
//! - `update` - Change a contact's birth year
//! - `remove` - Remove contacts by name
//! - `count` - Count contacts

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::{CliError, CliResult};
use objdb_core::Connection;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Contact book on top of objdb.
#[derive(Parser)]
#[command(name = "contacts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend to use (memory, file)
    #[arg(global = true, short, long)]
    backend: Option<String>,

    /// Data file of the file backend
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// JSON file with backend settings; flags take precedence
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a contact
    Add {
        /// Contact name
        name: String,

        /// Year of birth
        birth_year: u32,

        /// Group (family, friend, work)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// List contacts sorted by name
    List {
        /// Only contacts with this name
        #[arg(short, long)]
        name: Option<String>,

        /// Only contacts born after this year
        #[arg(long)]
        born_after: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Change the birth year of contacts with this name
    Update {
        /// Contact name
        name: String,

        /// New year of birth
        #[arg(long)]
        birth_year: u32,
    },

    /// Remove contacts with this name
    Remove {
        /// Contact name
        name: String,
    },

    /// Count contacts
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let backend_config = config::resolve(
        cli.config.as_deref(),
        cli.backend.as_deref(),
        cli.path.as_ref(),
    )?;
    debug!(config = ?backend_config, "resolved backend configuration");
    let conn = Connection::open(&backend_config)?;

    let result = dispatch(&conn, cli.command);
    let closed = conn.disconnect().map_err(CliError::from);
    result.and(closed)
}

fn dispatch(conn: &Connection, command: Commands) -> CliResult<()> {
    match command {
        Commands::Add {
            name,
            birth_year,
            group,
        } => {
            let key = commands::add::run(conn, &name, birth_year, group.as_deref())?;
            println!("added {name} as {key}");
        }
        Commands::List {
            name,
            born_after,
            format,
        } => {
            let contacts = commands::list::run(conn, name.as_deref(), born_after)?;
            match format {
                Format::Text => print!("{}", commands::list::render_text(&contacts)),
                Format::Json => println!("{}", serde_json::to_string_pretty(&contacts)?),
            }
        }
        Commands::Update { name, birth_year } => {
            let changed = commands::update::run(conn, &name, birth_year)?;
            println!("updated {changed} contact(s)");
        }
        Commands::Remove { name } => {
            let removed = commands::remove::run(conn, &name)?;
            println!("removed {removed} contact(s)");
        }
        Commands::Count => {
            println!("{}", commands::count::run(conn)?);
        }
    }
    Ok(())
}
