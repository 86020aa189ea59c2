//! Tabula CLI - deployment tooling for the session table.
//!
//! # Commands
//!
//! - `tabula sessions create-table` - Create the session table
//! - `tabula sessions drop-table --force` - Drop the session table
//! - `tabula sessions clear --force` - Delete every stored session
//! - `tabula sessions count` - Print the number of stored sessions
//! - `tabula sessions show <id>` - Pretty-print one session
//! - `tabula sessions codecs` - List the available codecs

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tabula_session::CodecKind;

mod commands;
mod error;

use commands::sessions::{self, Target};
use error::CliResult;

/// Tabula CLI - session table management
#[derive(Parser)]
#[command(name = "tabula")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Manage the Tabula session table")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} tabula sessions create-table\n  {} tabula sessions show 4f1c --codec migrating\n  {} DATABASE_URL=sqlite://app.db tabula sessions count",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    target: TargetArgs,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct TargetArgs {
    /// Database connection URL
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Session table name
    #[arg(long, global = true, env = "SESSION_TABLE")]
    table: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Session table management
    #[command(alias = "s")]
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Create the session table and its unique index
    CreateTable,

    /// Drop the session table
    DropTable {
        /// Required; the table and all sessions are lost
        #[arg(short, long)]
        force: bool,
    },

    /// Delete every stored session
    Clear {
        /// Required; every user is signed out
        #[arg(short, long)]
        force: bool,
    },

    /// Print the number of stored sessions
    Count,

    /// Load one session and pretty-print it
    Show {
        /// Session identifier
        id: String,

        /// Codec used to read the data column
        #[arg(short, long, value_enum, default_value_t = CodecArg::Migrating)]
        codec: CodecArg,
    },

    /// List the available codecs
    Codecs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CodecArg {
    #[value(name = "native_binary")]
    NativeBinary,
    Json,
    Migrating,
    #[value(name = "passthrough")]
    PassThrough,
}

impl From<CodecArg> for CodecKind {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::NativeBinary => CodecKind::NativeBinary,
            CodecArg::Json => CodecKind::Json,
            CodecArg::Migrating => CodecKind::Migrating,
            CodecArg::PassThrough => CodecKind::PassThrough,
        }
    }
}

// =============================================================================
// UI HELPERS
// =============================================================================

pub(crate) fn success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub(crate) fn warn(msg: &str) {
    println!("  {} {}", "⚠".yellow().bold(), msg.yellow());
}

pub(crate) fn info(msg: &str) {
    println!("  {} {}", "→".cyan(), msg);
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    tabula_log::init();
    if cli.verbose {
        tabula_log::set_debug(true);
    } else if std::env::var_os("TABULA_LOG_LEVEL").is_none() {
        tabula_log::set_level(tabula_log::Level::Warn);
    }

    let target = Target {
        database_url: cli.target.database_url,
        table: cli.target.table,
    };

    let result: CliResult<()> = match cli.command {
        Commands::Sessions { command } => match command {
            SessionCommands::CreateTable => sessions::create_table(&target).await,
            SessionCommands::DropTable { force } => sessions::drop_table(&target, force).await,
            SessionCommands::Clear { force } => sessions::clear(&target, force).await,
            SessionCommands::Count => sessions::count(&target).await,
            SessionCommands::Show { id, codec } => {
                sessions::show(&target, &id, codec.into()).await
            }
            SessionCommands::Codecs => {
                sessions::codecs();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    };
}
