//! Grayline CLI - Command-line interface
//!
//! Renders day/night world maps with the gray line from the library's
//! projection pipeline, and manages the map cache and config file.

mod commands;
mod error;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use grayline::config::default_log_directory;
use grayline::logging::{init_logging, LoggingGuard, DEFAULT_LOG_FILE};

use commands::common::{load_config, resolve_app_config, ViewArgs};
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Parser)]
#[command(name = "grayline")]
#[command(version = grayline::VERSION)]
#[command(about = "Day/night world maps with a live gray line", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.grayline/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also print log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where the sun is overhead and how lit the station is
    Sun {
        /// Instant to evaluate, RFC 3339 (default: now)
        #[arg(long)]
        time: Option<String>,
    },

    /// Download missing or stale background maps
    Fetch,

    /// Render one frame to PNG files
    Render {
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Seconds to wait for maps and the first frame
        #[arg(long, default_value = "120")]
        timeout: u64,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Keep PNG files updated as the gray line moves
    Watch {
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let _logging = match start_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn start_logging(verbose: bool) -> Result<LoggingGuard, CliError> {
    init_logging(&default_log_directory(), DEFAULT_LOG_FILE, verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Sun { time } => {
            let config = load_config(config_path)?;
            commands::sun::run(&config, time.as_deref())
        }
        Commands::Fetch => {
            let config = load_config(config_path)?;
            commands::fetch::run(resolve_app_config(&config, &ViewArgs::default())?)
        }
        Commands::Render { out, timeout, view } => {
            let config = load_config(config_path)?;
            let app_config = resolve_app_config(&config, &view)?;
            commands::render::run(app_config, &out, Duration::from_secs(timeout))
        }
        Commands::Watch { out, view } => {
            let config = load_config(config_path)?;
            commands::watch::run(resolve_app_config(&config, &view)?, &out)
        }
        Commands::Config(command) => commands::config::run(command, config_path),
    }
}
