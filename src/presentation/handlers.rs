// Command handlers
use crate::application::catalog::DashboardKind;
use crate::infrastructure::config::{Settings, load_settings};
use crate::infrastructure::emitter::{check_all, write_all, write_stdout};
use crate::presentation::cli::{Cli, Command, init_tracing};
use anyhow::{Context, bail};
use std::path::PathBuf;
use tracing::{error, info};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings().context("failed to load settings")?;
    let pretty = settings.output.pretty && !cli.compact;

    match cli.command() {
        Command::List => list_dashboards(),
        Command::Print { name } => Ok(write_stdout(name, pretty)?),
        Command::Build { out_dir } => build_dashboards(&settings, out_dir, pretty),
        Command::Check => check_dashboards(),
    }
}

/// Entry point of the single-dashboard binaries.
pub fn print_dashboard(kind: DashboardKind) -> anyhow::Result<()> {
    init_tracing();
    let settings = load_settings().context("failed to load settings")?;
    write_stdout(kind, settings.output.pretty).with_context(|| format!("failed to print {}", kind))
}

fn list_dashboards() -> anyhow::Result<()> {
    for kind in DashboardKind::ALL {
        let dashboard = kind.build();
        println!("{:<14} {:<38} {}", kind.name(), kind.uid(), dashboard.title);
    }
    Ok(())
}

fn build_dashboards(settings: &Settings, out_dir: Option<PathBuf>, pretty: bool) -> anyhow::Result<()> {
    let dir = out_dir.unwrap_or_else(|| settings.output.dir.clone());
    let written = write_all(&dir, pretty).with_context(|| format!("failed to build into {}", dir.display()))?;
    info!(count = written.len(), dir = %dir.display(), "dashboards written");
    Ok(())
}

fn check_dashboards() -> anyhow::Result<()> {
    let problems = check_all();
    for (kind, problem) in &problems {
        error!(dashboard = %kind, "{}", problem);
    }
    if !problems.is_empty() {
        bail!("{} dashboard(s) failed validation", problems.len());
    }
    info!(count = DashboardKind::ALL.len(), "all dashboards valid");
    Ok(())
}
