use std::fmt;
use std::path::Path;

use crate::attrs::{AttributeStore, SUMMARY_ATTR, TYPE_ATTR};

/// Only files whose `type` attribute equals this tag are announced.
pub const CODE_TYPE: &str = "code";

/// Longest summary shown before it is cut, in Unicode code points.
pub const MAX_SUMMARY_CHARS: usize = 20;

/// Appended to a summary that was cut.
pub const ELLIPSIS: char = '…';

/// A summary ready for display: non-empty and at most `MAX_SUMMARY_CHARS + 1` code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySummary(String);

impl DisplaySummary {
    /// Keep the first `MAX_SUMMARY_CHARS` code points, adding `ELLIPSIS` if anything was dropped.
    pub fn truncated(summary: &str) -> Self {
        match summary.char_indices().nth(MAX_SUMMARY_CHARS) {
            Some((cut, _)) => {
                let mut text = summary[..cut].to_string();
                text.push(ELLIPSIS);
                Self(text)
            }
            None => Self(summary.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classify a newly created path.
///
/// Returns nothing when the path vanished or is a directory, when it is the path
/// already announced, or when it is not a qualifying file. The caller records the
/// path as announced only after this returns a summary.
pub fn classify(
    path: &Path,
    last_announced: Option<&Path>,
    attrs: &dyn AttributeStore,
) -> Option<DisplaySummary> {
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => {}
        _ => return None,
    }
    if last_announced == Some(path) {
        return None;
    }
    summarize(path, attrs)
}

/// The display summary of a qualifying file: `type` is `code` and `summary` is non-empty.
pub fn summarize(path: &Path, attrs: &dyn AttributeStore) -> Option<DisplaySummary> {
    if attrs.read(path, TYPE_ATTR) != CODE_TYPE {
        return None;
    }
    let summary = attrs.read(path, SUMMARY_ATTR);
    if summary.is_empty() {
        return None;
    }
    Some(DisplaySummary::truncated(&summary))
}
