//! CLI module
//!
//! Command-line interface over a [`Session`](crate::session::Session).
//!
//! # Commands
//!
//! - `init` - Write a configuration template
//! - `test` - Health-check configured connections
//! - `query` - Run a portable query
//! - `describe` - Show an entity's fields
//! - `serve` - Serve the tool catalogue over HTTP or stdio

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{handle_line, router, serve, serve_stdio};
