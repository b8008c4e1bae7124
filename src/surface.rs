use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

/// Where the current status label is shown.
pub trait StatusSurface: Send + Sync {
    fn set_label(&self, text: &str);
}

/// Prints each label to stdout and optionally mirrors it into a file that
/// status bars (xbar, polybar, waybar, ...) can poll.
pub struct ConsoleSurface {
    label_file: Option<PathBuf>,
}

impl ConsoleSurface {
    pub fn new(label_file: Option<PathBuf>) -> Self {
        Self { label_file }
    }
}

impl StatusSurface for ConsoleSurface {
    fn set_label(&self, text: &str) {
        debug!(label = text, "status label");

        let mut stdout = io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{text}").and_then(|()| stdout.flush()) {
            debug!(error = %err, "failed to print status label");
        }

        if let Some(path) = &self.label_file
            && let Err(err) = std::fs::write(path, format!("{text}\n"))
        {
            warn!(path = %path.display(), error = %err, "failed to write label file");
        }
    }
}

/// Treat every line read from stdin as a click. Stops quietly at end of input.
pub fn spawn_stdin_clicks<F>(on_click: F) -> io::Result<JoinHandle<()>>
where
    F: Fn() + Send + 'static,
{
    thread::Builder::new()
        .name("stdin-clicks".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(_) => on_click(),
                    Err(err) => {
                        warn!(error = %err, "stdin click source failed");
                        return;
                    }
                }
            }
            debug!("stdin closed; stdin clicks disabled");
        })
}

/// Treat every `SIGUSR1` as a click. Each click runs on a blocking thread.
#[cfg(unix)]
pub async fn signal_clicks<F>(on_click: F) -> io::Result<()>
where
    F: Fn() + Clone + Send + 'static,
{
    use tokio::signal::unix::{SignalKind, signal};

    let mut usr1 = signal(SignalKind::user_defined1())?;
    while usr1.recv().await.is_some() {
        let handler = on_click.clone();
        if let Err(err) = tokio::task::spawn_blocking(handler).await {
            warn!(error = %err, "click handler panicked");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn signal_clicks<F>(_on_click: F) -> io::Result<()>
where
    F: Fn() + Clone + Send + 'static,
{
    std::future::pending().await
}
