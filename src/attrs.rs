use std::io;
use std::path::Path;

use tracing::debug;

/// Attribute holding the classification tag of a file.
pub const TYPE_ATTR: &str = "type";
/// Attribute holding the human-readable summary of a file.
pub const SUMMARY_ATTR: &str = "summary";

/// Read-only access to named string attributes attached to filesystem paths.
pub trait AttributeStore: Send + Sync {
    /// Raw attribute value, `Ok(None)` when the attribute is not set.
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Attribute value with surrounding whitespace trimmed.
    ///
    /// Absence, a vanished path and I/O failures all read as the empty string: every
    /// caller treats "no value" as "not eligible".
    fn read(&self, path: &Path, name: &str) -> String {
        match self.get(path, name) {
            Ok(Some(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Ok(None) => String::new(),
            Err(err) => {
                debug!(path = %path.display(), attr = name, error = %err, "attribute read failed");
                String::new()
            }
        }
    }
}

/// Extended file attributes (xattrs), with a namespace prefix such as `user.`.
#[derive(Debug, Clone)]
pub struct XattrStore {
    prefix: String,
}

impl XattrStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

impl AttributeStore for XattrStore {
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        xattr::get(path, self.qualified(name))
    }
}
