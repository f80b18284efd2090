//! Command-line interface for tabdeck.
//!
//! Inspects and manipulates the saved tab arrangement outside of a running
//! workspace.

use crate::config::{Config, LogLevel};
use crate::services::{LocalFileService, ShellProcessService};
use crate::session::{SnapshotStore, YamlSnapshotStore};
use crate::tab::{OpenMode, TabEntry, TabWorkspace};
use crate::workbench::{Workbench, WorkbenchOptions};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// tabdeck - unified editor + terminal tab sessions
#[derive(Parser, Debug)]
#[command(name = "tabdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.config/tabdeck/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level for the debug log (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the saved session
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Delete the saved session
    Clear,
    /// Restore the saved session, print it and save it again
    Restore,
    /// Open files into the saved session
    Open {
        /// Files to open, in order
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Open as preview tabs (each replaces the previous preview)
        #[arg(long)]
        preview: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = LogLevel::all().iter().map(|l| l.display_name()).collect();
        format!("unknown log level '{}', expected one of: {}", value, names.join(", "))
    })
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Execute the parsed command
pub fn run(cli: Cli, runtime: &Runtime) -> Result<()> {
    let config = load_config(&cli)?;
    crate::debug::apply_config_level(config.log_level);

    let snapshot_path = config.session_snapshot_path();
    let store = YamlSnapshotStore::new(&snapshot_path);
    log::info!("Using session snapshot {:?}", snapshot_path);

    match cli.command {
        Commands::Show { format } => show(&store, format),
        Commands::Clear => {
            store.clear()?;
            println!("Cleared {}", snapshot_path.display());
            Ok(())
        }
        Commands::Restore => runtime.block_on(async {
            let mut workbench = workbench(store, &config);
            let summary = workbench.restore().await;
            if summary.discarded_stale {
                println!("Saved session was too old and has been discarded");
            }
            println!(
                "Restored {} editors, {} terminals ({} skipped)",
                summary.restored_editors, summary.restored_terminals, summary.skipped
            );
            print_workspace(workbench.workspace());
            workbench.flush();
            Ok(())
        }),
        Commands::Open { paths, preview } => runtime.block_on(async {
            let mode = if preview {
                OpenMode::Preview
            } else {
                OpenMode::Pinned
            };
            let mut workbench = workbench(store, &config);
            workbench.restore().await;
            for path in paths {
                let path = std::path::absolute(&path)
                    .with_context(|| format!("Failed to resolve {:?}", path))?;
                if let Err(e) = workbench.open_file(&path, mode).await {
                    eprintln!("tabdeck: {e}");
                }
            }
            print_workspace(workbench.workspace());
            workbench.flush();
            Ok(())
        }),
    }
}

fn workbench(
    store: YamlSnapshotStore,
    config: &Config,
) -> Workbench<LocalFileService, ShellProcessService, YamlSnapshotStore> {
    let mut options = WorkbenchOptions::from(&config.session);
    // An explicit command always restores
    options.restore_on_startup = true;
    Workbench::new(
        LocalFileService,
        ShellProcessService::new(),
        Arc::new(store),
        options,
        tokio::runtime::Handle::current(),
    )
}

fn show(store: &YamlSnapshotStore, format: OutputFormat) -> Result<()> {
    let Some(snapshot) = store.load()? else {
        println!("No saved session");
        return Ok(());
    };
    let text = match format {
        OutputFormat::Yaml => {
            serde_yaml_ng::to_string(&snapshot).context("Failed to serialize session")?
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize session")?
        }
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn print_workspace(workspace: &TabWorkspace) {
    let active = workspace.active();
    for (index, entry) in workspace.tabs().enumerate() {
        let marker = if active == Some(entry.tab_ref()) { '*' } else { ' ' };
        let location = match entry {
            TabEntry::Editor(record) => record
                .file_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            TabEntry::Terminal(record) => record.cwd.display().to_string(),
        };
        println!(
            "{marker} {index:>2}  {:<8} {:<20} {location}",
            format!("{:?}", entry.tab_ref().kind()).to_lowercase(),
            entry.title()
        );
    }
}
