//! Command-line interface for Registrarr.

use clap::{Parser, Subcommand};

/// Registrarr - User registration and profile service
#[derive(Parser)]
#[command(name = "registrarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web service (default when no command is given)
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config file
    Init,
}
