mod cli;
mod commands;
mod connection;
mod input;
mod settings;
mod shutdown;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over -v
    let default_filter = if args.verbose {
        "meatbridge=debug,meatbridge_core=debug"
    } else {
        "meatbridge=info,meatbridge_core=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match args.command {
        Some(Command::Run { connection }) => commands::run::run(&connection),
        Some(Command::Status { pid, json }) => commands::status::run(pid, json),
        Some(Command::Locations { id }) => commands::locations::run(id),
        None => commands::run::run(&args.connection),
    }
}
