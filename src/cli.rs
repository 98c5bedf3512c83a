use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sidbroker")]
#[command(author, version, about = "Pipeline action broker for Sids")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the actions available for a Sid
    Actions {
        /// Sid to look up, e.g. PROJ/A/CHAR/HERO/MOD/V001/W/maya
        #[arg(required = true)]
        sid: String,

        /// Only include engine actions valid for this engine
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// List the jobs implementing an action for a Sid
    Jobs {
        /// Sid to look up
        #[arg(required = true)]
        sid: String,

        /// Action name
        #[arg(required = true)]
        action: String,
    },

    /// Run an action on a Sid
    Run {
        /// Action name
        #[arg(required = true)]
        action: String,

        /// Sid to run the action on
        #[arg(required = true)]
        sid: String,

        /// Only consider jobs that run in this engine
        #[arg(short, long)]
        engine: Option<String>,

        /// Show what would be done without executing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the current engine and what it implements
    Engine,

    /// Check that the commands used by batch jobs are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Write the built-in catalog to a config file
    Init {
        /// Where to write the config
        #[arg(default_value = "sidbroker.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}
