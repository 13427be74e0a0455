//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Enterprise Bridge CLI
#[derive(Parser, Debug)]
#[command(name = "enterprise-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented configuration template
    Init {
        /// Destination (defaults to --config or ~/.enterprise-bridge/config.yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Health-check one connection, or all of them
    Test {
        /// Connection name (empty = all)
        connection: Option<String>,
    },

    /// Query records
    Query {
        /// Connection name
        #[arg(short, long)]
        connection: String,

        /// Entity / object / record type
        #[arg(short, long)]
        entity: String,

        /// Filters as a JSON object, e.g. '{"Amount__gt": 1000}'
        #[arg(short, long)]
        filters: Option<String>,

        /// Fields to return (comma-separated)
        #[arg(long)]
        fields: Option<String>,

        /// Page size
        #[arg(long, default_value = "100")]
        limit: u32,

        /// Rows to skip
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Describe an entity's fields
    Describe {
        /// Connection name
        #[arg(short, long)]
        connection: String,

        /// Entity / object / record type
        #[arg(short, long)]
        entity: String,

        /// Bypass the schema cache
        #[arg(long)]
        refresh: bool,
    },

    /// Serve the tool catalogue over HTTP or stdio
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Read tool calls from stdin instead of listening
        #[arg(long)]
        stdio: bool,
    },
}
