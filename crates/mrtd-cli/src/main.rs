use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod formatters;
mod replay;

use commands::SessionArgs;
use formatters::FormatMode;

#[derive(Parser)]
#[command(name = "mrtd")]
#[command(about = "eMRTD Reader - Read electronic passports and ID cards over NFC")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a contactless reader is available
    Supported,

    /// Validate BAC inputs and show the derived key and data group order
    Plan {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Run a read session against a captured document
    Read {
        #[command(flatten)]
        session: SessionArgs,

        /// Capture file (JSON) to serve instead of a live chip
        #[arg(long, value_name = "FILE")]
        replay: PathBuf,

        /// Output format mode
        #[arg(short, long, value_enum, default_value_t = FormatMode::Human)]
        format: FormatMode,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing subscriber with environment-based filtering
    // Set RUST_LOG=debug for detailed logs, RUST_LOG=trace for very verbose
    // Default: info level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let ok = match cli.command {
        Command::Supported => commands::supported::cmd_supported(),
        Command::Plan { session } => commands::plan::cmd_plan(&session),
        Command::Read {
            session,
            replay,
            format,
        } => commands::read::cmd_read(&session, &replay, format).await,
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
