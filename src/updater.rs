use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use tokio::time::{Instant, interval_at};
use tracing::{info, warn};

/// Relaunches the process when its executable is replaced on disk.
///
/// The baseline is the executable's modification time at startup. It only moves when a
/// relaunch actually happens, so a failed spawn is retried on the next tick.
pub struct UpdateSupervisor {
    exe: PathBuf,
    args: Vec<OsString>,
    baseline: SystemTime,
    period: Duration,
}

fn modified_time(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

impl UpdateSupervisor {
    /// Record the baseline of `exe`. The relaunched process gets `args`, which are this
    /// process's own arguments in `main`.
    pub fn new(exe: PathBuf, args: Vec<OsString>, period: Duration) -> anyhow::Result<Self> {
        let baseline = modified_time(&exe)
            .with_context(|| format!("failed to read modification time of {}", exe.display()))?;
        Ok(Self {
            exe,
            args,
            baseline,
            period,
        })
    }

    /// True when the executable on disk is strictly newer than the baseline.
    /// An unreadable executable (mid-replacement, say) is not an update yet.
    pub fn is_updated(&self) -> bool {
        match modified_time(&self.exe) {
            Ok(modified) => modified > self.baseline,
            Err(_) => false,
        }
    }

    /// Poll every period until the executable is updated and `relaunch` succeeds.
    ///
    /// Returning is the signal for the caller to shut down; a failed relaunch is logged
    /// and polling carries on.
    pub async fn run<F>(self, mut relaunch: F)
    where
        F: FnMut(&Path, &[OsString]) -> io::Result<()>,
    {
        let mut ticks = interval_at(Instant::now() + self.period, self.period);
        loop {
            ticks.tick().await;
            if !self.is_updated() {
                continue;
            }
            info!(exe = %self.exe.display(), "executable updated; relaunching");
            match relaunch(&self.exe, &self.args) {
                Ok(()) => return,
                Err(err) => warn!(exe = %self.exe.display(), error = %err, "relaunch failed"),
            }
        }
    }
}

/// Start `exe` with `args` without waiting for it.
///
/// The supervisor passes the arguments this process was started with, so a replacement
/// launched with `--config` keeps the same configuration. Started without arguments, it
/// gets none.
pub fn spawn_detached(exe: &Path, args: &[OsString]) -> io::Result<()> {
    let mut command = Command::new(exe);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // Own process group, so signals aimed at this one do not reach the replacement.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    command.spawn().map(drop)
}
