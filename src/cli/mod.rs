pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "freshet")]
#[command(about = "Fetch documents only when they have changed", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/freshet/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Per-request timeout (e.g., "10s", "500ms")
    #[arg(short, long, global = true)]
    pub timeout: Option<String>,

    /// Extra request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", global = true)]
    pub headers: Vec<String>,

    /// Never probe with HEAD; always download and compare
    #[arg(long, global = true)]
    pub no_head: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll each input once and report whether it changed
    Check {
        /// URLs or file paths; "-" reads inline data from stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// JSON file that keeps watch state between runs. Local files and
        /// stdin are reported once per state file.
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
    /// Poll inputs on an interval and report every change
    Watch {
        /// URLs or file paths; "-" reads inline data from stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Poll interval (e.g., "30s", "5m", "1h")
        #[arg(short, long)]
        interval: Option<String>,

        /// Maximum number of sources polled at the same time
        #[arg(short, long)]
        workers: Option<usize>,

        /// Directory that receives the body of every changed URL
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
