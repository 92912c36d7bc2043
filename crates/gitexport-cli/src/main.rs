//! gitexport CLI - inspect and rewrite git fast-export streams.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// gitexport - git fast-export stream codec
#[derive(Parser, Debug)]
#[command(name = "gitexport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token and fields of every line
    Tokens {
        /// Input stream (default: stdin)
        input: Option<PathBuf>,
    },

    /// Parse every commit and print a summary
    Commits {
        /// Input stream (default: stdin)
        input: Option<PathBuf>,
        /// Print summaries as a JSON array
        #[arg(long)]
        json: bool,
        /// Skip records other than commits instead of failing
        #[arg(long)]
        skip_unsupported: bool,
    },

    /// Parse every commit and write it back in canonical form
    Rewrite {
        /// Input stream (default: stdin)
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip records other than commits instead of failing
        #[arg(long)]
        skip_unsupported: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gitexport={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Tokens { input } => commands::tokens(input.as_deref()),
        Commands::Commits {
            input,
            json,
            skip_unsupported,
        } => commands::commits(input.as_deref(), json, skip_unsupported),
        Commands::Rewrite {
            input,
            output,
            skip_unsupported,
        } => commands::rewrite(input.as_deref(), output.as_deref(), skip_unsupported),
        Commands::Version => {
            println!("gitexport {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
