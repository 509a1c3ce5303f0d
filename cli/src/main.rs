use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use code_tools_fs::{Config, Context};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod command_exec;
mod error;

use error::CliError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ErrorFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "code-tools-fs")]
#[command(about = "Filesystem tools: list, tree, glob, copy, move, delete and remove.")]
struct Cli {
    /// Config file (`.toml` or `.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[arg(long, value_enum, default_value_t = ErrorFormat::Text)]
    error_format: ErrorFormat,

    /// Pretty-print JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List directory entries.
    List {
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        recursive: bool,
        #[arg(long, default_value_t = false)]
        show_hidden: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Render a directory as an ASCII tree.
    Tree {
        path: PathBuf,
        /// Maximum depth (`0` for unlimited).
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long, default_value_t = false)]
        show_hidden: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Find files matching a glob pattern (supports `**`).
    Glob {
        pattern: String,
        /// Directory to search in (defaults to the base directory).
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Copy {
        source: PathBuf,
        destination: PathBuf,
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    Move {
        source: PathBuf,
        destination: PathBuf,
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    /// Delete a single file.
    Delete { path: PathBuf },
    /// Remove a file or directory.
    Remove {
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        recursive: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let error_format = cli.error_format;
    if let Err(err) = run(&cli) {
        match error_format {
            ErrorFormat::Text => eprintln!("{err}"),
            ErrorFormat::Json => {
                let out = error::render_error_json(&err);
                match serde_json::to_string(&out) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("{err}"),
                }
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => code_tools_fs::load_config(path)?,
        None => Config::default(),
    };
    init_tracing(&config.logging.level);
    tracing::debug!(command = ?cli.command, "running command");
    let ctx = Context::new(config)?;
    command_exec::run_with_context(cli, &ctx)
}

/// Logs go to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_ascii_lowercase()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

pub(crate) fn serialize_json(value: &serde_json::Value, pretty: bool) -> Result<String, CliError> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

pub(crate) fn write_stdout_line(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").map_err(CliError::Output)?;
    stdout.flush().map_err(CliError::Output)
}
