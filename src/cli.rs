// src/cli.rs

//! Command-line definitions for the webarc binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webarc")]
#[command(version)]
#[command(about = "Incremental web-archive assembly with overlay layering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the output tree described by a TOML descriptor
    Assemble {
        /// Path to the assembly descriptor
        #[arg(short, long, default_value = "webarc.toml")]
        config: PathBuf,
    },
}
