use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `NutriSight` - camera-driven health action tracking with a nutrition ledger.
#[derive(Parser, Debug)]
#[command(name = "nutrisight")]
#[command(version)]
#[command(
    about = "Detect health actions in camera frames and keep a running nutrition ledger.",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway (REST API and tool protocol)
    Serve {
        /// Port to listen on (use 0 for random available port; default from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Feed image files through the tracker in order and print each transition
    Analyze {
        /// Frame images, in capture order
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// Look up enrichment info for each completed action
        #[arg(long)]
        enrich: bool,
    },

    /// Print a simulated smart-watch snapshot
    WatchData {
        /// JSON object merged over the generated values
        #[arg(long = "override")]
        override_json: Option<String>,
    },
}
