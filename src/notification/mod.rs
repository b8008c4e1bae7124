pub mod label;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::attrs::{AttributeStore, SUMMARY_ATTR};
use crate::classify::{DisplaySummary, classify, summarize};
use crate::clipboard::Clipboard;
use crate::surface::StatusSurface;
use crate::walker::find_latest_qualifying;
use label::{IDLE_LABEL, announced_label};

/// What a click on the status surface ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The announced summary was still current and on the clipboard; it was copied again.
    Refreshed,
    /// This file was (re-)announced.
    Shown(PathBuf),
    /// No qualifying file anywhere under the watch root.
    Nothing,
    /// A creation event announced another file while the click was looking around.
    Superseded,
}

#[derive(Clone)]
struct Announcement {
    path: PathBuf,
    summary: DisplaySummary,
    generation: u64,
}

/// `current` is `Some` exactly while the label shows a summary.
#[derive(Default)]
struct NotificationState {
    current: Option<Announcement>,
    generation: u64,
}

impl NotificationState {
    fn label(&self) -> String {
        match &self.current {
            Some(announcement) => announced_label(&announcement.summary),
            None => IDLE_LABEL.to_string(),
        }
    }
}

/// Collaborators the announcer drives.
pub struct Outputs {
    pub attrs: Arc<dyn AttributeStore>,
    pub surface: Arc<dyn StatusSurface>,
    pub clipboard: Arc<dyn Clipboard>,
}

/// Shows the summary of the most recently created qualifying file, then reverts to idle.
///
/// All transitions (a file was created, the dwell time ran out, the surface was clicked)
/// go through one mutex, so a file is announced at most once in a row and an old revert
/// timer can never clear a newer announcement.
pub struct Announcer {
    watch_root: PathBuf,
    dwell: Duration,
    outputs: Outputs,
    runtime: Handle,
    state: Mutex<NotificationState>,
}

impl Announcer {
    /// Create the announcer and put the surface in its idle state.
    ///
    /// Revert timers are spawned on `runtime`, so the transitions can be triggered from
    /// any thread.
    pub fn new(
        watch_root: PathBuf,
        dwell: Duration,
        outputs: Outputs,
        runtime: Handle,
    ) -> Arc<Self> {
        outputs.surface.set_label(IDLE_LABEL);
        Arc::new(Self {
            watch_root,
            dwell,
            outputs,
            runtime,
            state: Mutex::new(NotificationState::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, NotificationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The label currently on the surface.
    #[cfg(test)]
    pub fn label(&self) -> String {
        self.lock().label()
    }

    /// The file currently announced, if any.
    #[cfg(test)]
    pub fn tracked_path(&self) -> Option<PathBuf> {
        self.lock().current.as_ref().map(|a| a.path.clone())
    }

    /// Handle a newly created file. Returns whether it was announced.
    pub fn on_created(self: &Arc<Self>, path: &Path) -> bool {
        let mut state = self.lock();
        let last = state.current.as_ref().map(|a| a.path.as_path());
        let Some(summary) = classify(path, last, self.outputs.attrs.as_ref()) else {
            return false;
        };
        self.announce(&mut state, path.to_path_buf(), summary);
        true
    }

    /// Handle a click on the status surface.
    ///
    /// If the announced summary is unchanged on disk and still on the clipboard, it is
    /// only copied again. Otherwise the announced file is shown again, or, when it is
    /// gone or no longer qualifies, the most recently modified qualifying file under the
    /// watch root.
    ///
    /// The attribute reads, the clipboard read and the tree walk run without the lock.
    /// If a creation event announced another file in the meantime, that announcement
    /// stands and the click is dropped.
    pub fn on_click(self: &Arc<Self>) -> ClickOutcome {
        let shown = self.lock().current.clone();
        let shown_generation = shown.as_ref().map(|a| a.generation);

        if let Some(current) = &shown
            && self.still_on_clipboard(current)
        {
            let mut state = self.lock();
            if state.current.as_ref().map(|a| a.generation) == shown_generation {
                self.copy(current.summary.as_str());
                return ClickOutcome::Refreshed;
            }
            return self.show(
                &mut state,
                shown_generation,
                current.path.clone(),
                current.summary.clone(),
            );
        }

        let attrs = self.outputs.attrs.as_ref();
        let tracked = shown
            .as_ref()
            .filter(|a| a.path.is_file())
            .and_then(|a| summarize(&a.path, attrs).map(|s| (a.path.clone(), s)));
        let candidate = tracked.or_else(|| {
            let path = find_latest_qualifying(&self.watch_root, attrs)?;
            let summary = summarize(&path, attrs)?;
            Some((path, summary))
        });

        let Some((path, summary)) = candidate else {
            debug!(root = %self.watch_root.display(), "click found no qualifying file");
            return ClickOutcome::Nothing;
        };
        let mut state = self.lock();
        self.show(&mut state, shown_generation, path, summary)
    }

    /// Announce `path` for a click, unless the state moved on to another announcement
    /// since the click looked at generation `seen`.
    fn show(
        self: &Arc<Self>,
        state: &mut NotificationState,
        seen: Option<u64>,
        path: PathBuf,
        summary: DisplaySummary,
    ) -> ClickOutcome {
        if let Some(current) = &state.current
            && Some(current.generation) != seen
        {
            debug!(path = %current.path.display(), "click superseded by a newer announcement");
            return ClickOutcome::Superseded;
        }
        self.announce(state, path.clone(), summary);
        ClickOutcome::Shown(path)
    }

    fn still_on_clipboard(&self, current: &Announcement) -> bool {
        if !current.path.is_file() {
            return false;
        }
        let on_disk = self.outputs.attrs.read(&current.path, SUMMARY_ATTR);
        if on_disk.is_empty() || DisplaySummary::truncated(&on_disk) != current.summary {
            return false;
        }
        matches!(self.outputs.clipboard.read_text(), Ok(text) if text == current.summary.as_str())
    }

    fn announce(
        self: &Arc<Self>,
        state: &mut NotificationState,
        path: PathBuf,
        summary: DisplaySummary,
    ) {
        state.generation += 1;
        let generation = state.generation;
        info!(path = %path.display(), summary = %summary, "announcing");

        self.copy(summary.as_str());
        state.current = Some(Announcement {
            path,
            summary,
            generation,
        });
        self.outputs.surface.set_label(&state.label());
        self.schedule_revert(generation);
    }

    fn copy(&self, text: &str) {
        if let Err(err) = self.outputs.clipboard.write_text(text) {
            warn!(error = %format!("{err:#}"), "clipboard write failed");
        }
    }

    fn schedule_revert(self: &Arc<Self>, generation: u64) {
        let announcer = Arc::downgrade(self);
        let dwell = self.dwell;
        self.runtime.spawn(async move {
            tokio::time::sleep(dwell).await;
            if let Some(announcer) = announcer.upgrade() {
                announcer.revert(generation);
            }
        });
    }

    /// Return to idle, unless a later announcement replaced the one `generation` belongs to.
    fn revert(&self, generation: u64) {
        let mut state = self.lock();
        match &state.current {
            Some(current) if current.generation == generation => {}
            _ => {
                debug!(generation, "stale revert ignored");
                return;
            }
        }
        state.current = None;
        self.outputs.surface.set_label(IDLE_LABEL);
    }
}
