//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Bind address, overriding the configured `host:port`
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// QoD command arguments.
#[derive(Debug, Args)]
pub struct QodCommand {
    /// Phone number of the target device (configured default when omitted)
    #[arg(short, long)]
    pub phone_number: Option<String>,

    /// IPv4 address of the application server the sessions target
    #[arg(short, long, default_value = "5.6.7.8")]
    pub service_ipv4: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (secrets redacted)
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
