//! naily — orchestration worker.
//!
//! # Usage
//!
//! ```text
//! naily start
//! naily config [--json]
//! naily version
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;

#[derive(Parser, Debug)]
#[command(
    name = "naily",
    version,
    about = "Orchestration worker",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the server and run it in the foreground until stopped.
    Start,

    /// Show the settings the worker would run with.
    Config(ConfigArgs),

    /// Print the worker version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Start => commands::start::run(),
        Commands::Config(args) => args.run(),
        Commands::Version => {
            println!("naily {}", naily::VERSION);
            Ok(())
        }
    }
}
