//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! mockingjay binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default listen address for `serve`.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Serve and inspect HTTP stubs.
#[derive(Parser, Debug)]
#[command(name = "mockingjay", about = "Serve and inspect HTTP stubs", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a stub file over HTTP until interrupted.
    Serve {
        /// Path to the stub file.
        #[arg(long, env = "MOCKINGJAY_STUBS")]
        stubs: PathBuf,

        /// Address to listen on.
        #[arg(long, env = "MOCKINGJAY_ADDR", default_value = DEFAULT_ADDR)]
        addr: SocketAddr,
    },

    /// Validate a stub file and list its stubs.
    Check {
        /// Path to the stub file.
        #[arg(long, env = "MOCKINGJAY_STUBS")]
        stubs: PathBuf,
    },

    /// Show which stub answers a request, and what it answers.
    Resolve {
        /// Path to the stub file.
        #[arg(long, env = "MOCKINGJAY_STUBS")]
        stubs: PathBuf,

        /// HTTP method of the request.
        method: String,

        /// Absolute URL of the request.
        url: String,
    },
}
