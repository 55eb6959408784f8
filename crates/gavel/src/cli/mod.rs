//! cli subcommands for gavel.
//!
//! - `gavel serve` - run the marketplace auction server
//! - `gavel sweep` - run one expiry sweep pass and exit

mod serve;
mod sweep;

pub use serve::ServeCommand;
pub use sweep::SweepCommand;

use clap::{Parser, Subcommand};

/// gavel - campus marketplace auction service
#[derive(Parser, Debug)]
#[command(name = "gavel")]
#[command(about = "Campus marketplace auction service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the auction server
    Serve(ServeCommand),

    /// run a single expiry sweep and exit
    Sweep(SweepCommand),
}
