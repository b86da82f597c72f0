//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Luaform - Lua source-to-source transformer
#[derive(Parser)]
#[command(name = "luaform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transform a Lua file ("-" reads standard input)
    Process {
        /// Source file
        input: PathBuf,

        /// Stop at the first failing rule (overrides the config file)
        #[arg(long, conflicts_with = "lenient")]
        strict: bool,

        /// Roll back failing rules and keep going (overrides the config file)
        #[arg(long)]
        lenient: bool,

        /// Output mode (overrides the config file)
        #[arg(short, long, value_parser = ["readable", "dense"])]
        mode: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Write to a file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available rules and their ordering
    Rules,

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}
