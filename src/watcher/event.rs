use std::path::PathBuf;

use notify::EventKind;
use tracing::debug;

/// Internal watch event types after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A directory appeared; it and its subtree must be registered.
    DirectoryCreated(PathBuf),
    /// A regular file appeared.
    FileCreated(PathBuf),
}

/// Turn a raw notify event into watch events.
///
/// Only creations count. Removals, renames and modifications are dropped, and so is a
/// created path that is already gone by the time it is stat'ed.
pub fn classify_event(event: &notify::Event) -> Vec<WatchEvent> {
    if !matches!(event.kind, EventKind::Create(_)) {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter_map(|path| match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Some(WatchEvent::DirectoryCreated(path.clone())),
            Ok(_) => Some(WatchEvent::FileCreated(path.clone())),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "created path vanished");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;

    #[test]
    fn test_create_events_are_split_by_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("sub");
        let file = dir.path().join("a.rs");
        fs::create_dir(&sub).unwrap();
        fs::write(&file, "").unwrap();

        let event = notify::Event::new(EventKind::Create(CreateKind::Any))
            .add_path(sub.clone())
            .add_path(file.clone());

        assert_eq!(
            classify_event(&event),
            vec![WatchEvent::DirectoryCreated(sub), WatchEvent::FileCreated(file)]
        );
    }

    #[test]
    fn test_non_create_events_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.rs");
        fs::write(&file, "").unwrap();

        for kind in [
            EventKind::Modify(ModifyKind::Any),
            EventKind::Remove(RemoveKind::File),
            EventKind::Access(notify::event::AccessKind::Any),
        ] {
            let event = notify::Event::new(kind).add_path(file.clone());
            assert!(classify_event(&event).is_empty(), "{:?} must be ignored", event.kind);
        }
    }

    #[test]
    fn test_vanished_path_is_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(dir.path().join("gone.rs"));
        assert!(classify_event(&event).is_empty());
    }
}
