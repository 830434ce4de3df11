//! CLI argument definitions for meatbridge.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "meatbridge")]
#[command(about = "Super Meat Boy multiworld client", version)]
pub struct Args {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where to connect; anything left out comes from the config file
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ConnectionArgs {
    /// Server address, e.g. archipelago.gg:38281
    #[arg(long, env = "MEATBRIDGE_SERVER")]
    pub server: Option<String>,

    /// Slot name
    #[arg(long, env = "MEATBRIDGE_SLOT")]
    pub slot: Option<String>,

    /// Slot password
    #[arg(long, env = "MEATBRIDGE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Store server, slot and password in the config file
    #[arg(long)]
    pub save: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the server and run the bridge (default)
    Run {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Show the game state and a save summary
    Status {
        /// Process ID (skip automatic detection)
        #[arg(long)]
        pid: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List location names
    Locations {
        /// Show a single location
        #[arg(long)]
        id: Option<i64>,
    },
}
