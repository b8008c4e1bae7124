pub mod event;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::Context;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::walker::list_tree;
use event::{WatchEvent, classify_event};

/// How long a file handed over by a directory re-scan suppresses its own creation event.
const RESCAN_DEDUP_WINDOW: Duration = Duration::from_secs(5);

/// Outcome of registering a directory subtree.
#[derive(Debug, Default)]
pub struct Registration {
    /// Directories now being watched.
    pub directories: usize,
    /// Directories that could not be watched.
    pub failed: usize,
    /// Regular files already present in the subtree at registration time.
    pub existing_files: Vec<PathBuf>,
}

/// Watches a folder tree for creations, one non-recursive watch per directory.
///
/// New directories are registered as soon as their creation is seen, together with
/// everything already inside them.
pub struct DirectoryWatcher {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<notify::Event>>,
    /// Files a re-scan already handed over, whose creation events may still be queued.
    rescanned: HashMap<PathBuf, Instant>,
}

impl DirectoryWatcher {
    pub fn new() -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .context("failed to create filesystem watcher")?;
        Ok(Self {
            watcher,
            events: rx,
            rescanned: HashMap::new(),
        })
    }

    /// Register `root` and every directory below it.
    ///
    /// Failing to watch `root` itself is an error; failures below it are logged and
    /// counted so one unreadable subdirectory does not stop the rest. Files are listed
    /// only after the watches are in place, so a file lands either in
    /// `existing_files` or in a later event.
    pub fn register_tree(&mut self, root: &Path) -> anyhow::Result<Registration> {
        self.watcher
            .watch(root, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;

        let mut registration = Registration {
            directories: 1,
            ..Registration::default()
        };
        let mut watched: HashSet<PathBuf> = HashSet::from([root.to_path_buf()]);
        for dir in list_tree(root).directories {
            self.watch_dir(dir, &mut watched, &mut registration);
        }

        // Directories created inside not-yet-watched ones during the first pass.
        let tree = list_tree(root);
        for dir in tree.directories {
            self.watch_dir(dir, &mut watched, &mut registration);
        }
        registration.existing_files = tree.files;
        Ok(registration)
    }

    fn watch_dir(
        &mut self,
        dir: PathBuf,
        watched: &mut HashSet<PathBuf>,
        registration: &mut Registration,
    ) {
        if watched.contains(&dir) {
            return;
        }
        match self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
            Ok(()) => registration.directories += 1,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to watch directory");
                registration.failed += 1;
            }
        }
        watched.insert(dir);
    }

    /// Process events until the watcher shuts down, handing every created regular file
    /// to `on_file`.
    ///
    /// A created directory is registered with its whole subtree first, and the files it
    /// already contains are handed over as well, so content written before the directory
    /// was watched is not missed.
    pub fn run<F>(mut self, mut on_file: F)
    where
        F: FnMut(&Path),
    {
        while let Ok(result) = self.events.recv() {
            self.handle(result, &mut on_file);
        }
        info!("filesystem watcher stopped");
    }

    /// One turn of the event loop. Errors are logged and never end the loop.
    fn handle<F>(&mut self, result: notify::Result<notify::Event>, on_file: &mut F)
    where
        F: FnMut(&Path),
    {
        match result {
            Ok(event) => {
                for watch_event in classify_event(&event) {
                    self.dispatch(watch_event, on_file);
                }
            }
            Err(err) => warn!(error = %err, "watcher error"),
        }
    }

    fn dispatch<F>(&mut self, event: WatchEvent, on_file: &mut F)
    where
        F: FnMut(&Path),
    {
        let now = Instant::now();
        self.rescanned
            .retain(|_, seen| now.duration_since(*seen) < RESCAN_DEDUP_WINDOW);

        match event {
            WatchEvent::FileCreated(path) => {
                if self.rescanned.remove(&path).is_some() {
                    debug!(path = %path.display(), "already handed over by re-scan");
                    return;
                }
                on_file(&path);
            }
            WatchEvent::DirectoryCreated(dir) => match self.register_tree(&dir) {
                Ok(registration) => {
                    debug!(
                        path = %dir.display(),
                        directories = registration.directories,
                        files = registration.existing_files.len(),
                        "registered new directory"
                    );
                    for file in registration.existing_files {
                        on_file(&file);
                        self.rescanned.insert(file, now);
                    }
                }
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "failed to register new directory");
                }
            },
        }
    }
}
