// Command-line definition for dashgen
use crate::application::catalog::DashboardKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate Grafana dashboard documents for the Home Assistant metrics
#[derive(Parser, Debug)]
#[command(name = "dashgen", version = env!("CARGO_PKG_VERSION"), long_about = None)]
pub struct Cli {
    /// Emit single-line JSON regardless of output.pretty
    #[arg(global = true, long)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the available dashboards
    List,

    /// Print one dashboard document to stdout
    Print {
        /// fems-energy, fems-detail, vw-id7 or vw-id7-detail
        name: DashboardKind,
    },

    /// Write every dashboard to <out-dir>/<name>.json
    Build {
        #[arg(long = "out-dir", help = "Output directory (default: output.dir setting)")]
        out_dir: Option<PathBuf>,
    },

    /// Validate every dashboard without writing anything
    Check,
}

impl Cli {
    /// Building everything is the default action.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build { out_dir: None })
    }
}

/// Logs go to stderr; stdout is reserved for JSON documents.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second init (tests, repeated calls) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
