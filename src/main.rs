mod attrs;
mod classify;
mod cli;
mod clipboard;
mod config;
mod logging;
mod notification;
mod surface;
#[cfg(test)]
mod testing;
mod updater;
mod walker;
mod watcher;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use attrs::XattrStore;
use cli::Cli;
use clipboard::SystemClipboard;
use config::Config;
use notification::{Announcer, Outputs};
use surface::ConsoleSurface;
use updater::UpdateSupervisor;
use watcher::DirectoryWatcher;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let exe = std::env::current_exe().context("failed to resolve the running executable")?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(&exe));
    let config = Config::load(&config_path)?;

    let supervisor = UpdateSupervisor::new(
        exe,
        std::env::args_os().skip(1).collect(),
        config.update_poll(),
    )?;

    let announcer = Announcer::new(
        config.folder.clone(),
        config.dwell(),
        Outputs {
            attrs: Arc::new(XattrStore::new(config.attribute_prefix.clone())),
            surface: Arc::new(ConsoleSurface::new(config.label_file.clone())),
            clipboard: Arc::new(SystemClipboard::spawn()?),
        },
        tokio::runtime::Handle::current(),
    );

    let mut watcher = DirectoryWatcher::new()?;
    let registration = watcher.register_tree(&config.folder)?;
    info!(
        folder = %config.folder.display(),
        directories = registration.directories,
        failed = registration.failed,
        "watching"
    );

    let on_file = Arc::clone(&announcer);
    std::thread::Builder::new()
        .name("watcher".into())
        .spawn(move || {
            watcher.run(|path| {
                on_file.on_created(path);
            })
        })
        .context("failed to spawn watcher thread")?;

    let on_click = Arc::clone(&announcer);
    surface::spawn_stdin_clicks(move || {
        on_click.on_click();
    })
    .context("failed to spawn stdin click reader")?;

    let on_signal = Arc::clone(&announcer);
    tokio::spawn(async move {
        let click = move || {
            on_signal.on_click();
        };
        if let Err(err) = surface::signal_clicks(click).await {
            warn!(error = %err, "signal clicks disabled");
        }
    });

    tokio::select! {
        () = supervisor.run(updater::spawn_detached) => {
            info!("replacement started; exiting");
        }
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl-C")?;
            info!("interrupted; exiting");
        }
    }

    Ok(())
}
