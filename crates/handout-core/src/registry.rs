use std::path::{Path, PathBuf};
use std::sync::RwLock;

use uuid::Uuid;

use crate::ShareError;

/// One shared file: the public id handed out in URLs and the canonical
/// path it resolves to. Entries are never mutated after insertion.
#[derive(Debug, Clone)]
struct ShareEntry {
    id: String,
    path: PathBuf,
}

/// An `(id, display name)` pair as shown on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareListing {
    pub id: String,
    pub name: String,
}

/// In-memory store of shared files.
///
/// Written to by whatever accepts registrations, read by the HTTP server
/// on every request. Insertion order is preserved for stable listings.
/// Contents do not survive process restart.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<Vec<ShareEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the file at `path`. Returns the generated id on success.
    ///
    /// The path is canonicalized first, so the entry keeps pointing at the
    /// same file if the working directory changes later. Paths that do not
    /// name an existing regular file are rejected with [`ShareError::NotAFile`]
    /// and leave the registry untouched.
    pub fn register(&self, path: impl AsRef<Path>) -> Result<String, ShareError> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).map_err(|e| not_a_file(e, path))?;
        let meta = std::fs::metadata(&canonical).map_err(|e| not_a_file(e, path))?;
        if !meta.is_file() {
            return Err(ShareError::NotAFile(path.to_path_buf()));
        }

        let id = Uuid::new_v4().to_string();
        self.entries.write().unwrap().push(ShareEntry {
            id: id.clone(),
            path: canonical,
        });
        Ok(id)
    }

    /// Snapshot of all shares in registration order.
    ///
    /// Deliberately does not stat the filesystem; a file deleted after
    /// registration stays listed and only fails at download time.
    pub fn list(&self) -> Vec<ShareListing> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .map(|e| ShareListing {
                id: e.id.clone(),
                name: display_name(&e.path),
            })
            .collect()
    }

    /// Stored path for `id`, or `None` if the id was never registered.
    pub fn resolve(&self, id: &str) -> Option<PathBuf> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.path.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn not_a_file(e: std::io::Error, path: &Path) -> ShareError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ShareError::NotAFile(path.to_path_buf())
    } else {
        ShareError::Io(e)
    }
}

/// File name component of `path`, as shown to downloaders.
pub fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}
