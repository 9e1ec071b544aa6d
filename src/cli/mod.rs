//! CLI module
//!
//! Command-line interface for running an ingestion.
//!
//! # Commands
//!
//! - `validate` - Check credentials and token scopes
//! - `ingest` - Run every step and write the collected graph
//! - `steps` - List ingestion steps

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
