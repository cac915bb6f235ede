use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "price-tracker")]
#[command(about = "Tracks vendor prices and refreshes them in the background")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "tracker.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override fetch strategy from config (auto, browser, static)
    #[arg(long)]
    pub strategy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the background refresh loop until Ctrl-C
    Serve,
    /// Refresh every stored price once and exit
    Refresh,
    /// Fetch the current price for one URL
    Fetch { url: String },
    /// Look up a product across known platforms and stored vendors
    Search { query: String },
    /// Create the database schema
    InitDb,
}
