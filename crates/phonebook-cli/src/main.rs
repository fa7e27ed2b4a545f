use std::io::{self, BufReader};
use std::thread;

use anyhow::Context;
use clap::Parser;
use phonebook_store::Directory;
use tracing::{debug, warn, Level};

mod cli;
mod config;
mod controller;
mod view;

use config::PhonebookConfig;
use controller::Controller;
use view::{ConsoleView, InterruptHandle};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = match &cli.config {
        Some(path) => PhonebookConfig::load(path)?,
        None => PhonebookConfig::default(),
    };

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.level()?.unwrap_or(Level::WARN)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    if cli.no_color || !config.color {
        colored::control::set_override(false);
    }

    let view = ConsoleView::spawn(BufReader::new(io::stdin()), io::stdout())
        .context("starting console reader")?;
    forward_interrupts(view.interrupt_handle())?;
    let mut controller = Controller::new(view, Directory::new());
    if let Some(path) = cli.file.or(config.default_file) {
        controller.open_path(&path);
    }
    controller.run();

    debug!(
        contacts = controller.directory().len(),
        path = ?controller.opened_path(),
        unsaved = controller.directory().is_dirty(),
        "session ended"
    );
    Ok(())
}

/// Route Ctrl-C to the console instead of terminating the process.
fn forward_interrupts(handle: InterruptHandle) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;
    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async move {
                loop {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!(error = %e, "cannot listen for Ctrl-C");
                        return;
                    }
                    debug!("Ctrl-C received");
                    if !handle.interrupt() {
                        return;
                    }
                }
            })
        })
        .context("starting signal thread")?;
    Ok(())
}
