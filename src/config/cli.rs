use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bulk-user-export")]
#[command(about = "Export local user records to a bulk-ingest API in batches")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "export-config.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Do not print the per-record progress line
    #[arg(long)]
    pub no_progress: bool,

    /// Project and batch the source without sending anything
    #[arg(long)]
    pub dry_run: bool,
}
