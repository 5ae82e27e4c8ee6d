//! Sheetfill - filter, fill in and correct rows of a spreadsheet.

mod cli;
mod config;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use clap::Parser;
use sheetfill_core::{Editor, StoreOptions, TableStore, open_store};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sheetfill", version)]
#[command(about = "Filter, fill in and correct rows of a spreadsheet")]
struct Args {
    /// Spreadsheet to edit (.xlsx or .csv; .xls and .ods are read-only; defaults to `file` from the config)
    #[arg(short, long, global = true, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Config file to use instead of the one in the user config dir
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write diagnostics to this file instead of the default destination
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Without a subcommand the interactive editor starts
    #[command(subcommand)]
    command: Option<cli::Command>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let interactive = args.command.is_none();

    let log_file = match args.log_file.clone() {
        Some(path) => Some(path),
        None if interactive => logging::default_log_file(),
        None => None,
    };
    logging::init(log_file.as_deref())?;

    let (mut config, warnings) = config::load_config(args.config.as_deref());
    for warning in warnings {
        tracing::warn!("{}", warning);
        if interactive {
            eprintln!("Warning: {}", warning);
        }
    }
    if let Some(file) = args.file {
        config.file = file;
    }
    tracing::debug!(?config, "resolved configuration");

    let store = open_store(
        config.file.clone(),
        &StoreOptions {
            sheet_name: config.sheet_name.clone(),
        },
    );
    let mut editor = Editor::new(store).with_export_sheet_name(&config.export_sheet_name);

    match args.command {
        Some(command) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            cli::execute(command, &mut editor, &config, &mut out)
        }
        None => run_interactive(editor, &config),
    }
}

#[cfg(feature = "tui")]
fn run_interactive(editor: Editor<Box<dyn TableStore>>, config: &config::Config) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut app = tui::App::new(editor, config.export_file.clone())
        .with_context(|| format!("open {}", config.file.display()))?;
    tui::run(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_editor: Editor<Box<dyn TableStore>>, _config: &config::Config) -> anyhow::Result<()> {
    anyhow::bail!("interactive mode needs the `tui` feature; use a subcommand (see --help)")
}
