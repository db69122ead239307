//! Depth-first traversal of a sync root.
//!
//! [`TreeWalker`] keeps an explicit stack of open directory listings and
//! yields one [`LocalFile`] per regular file, lazily. Symlinks are followed to
//! whatever they point at; dangling links and special files (sockets, FIFOs,
//! devices) are skipped. A symlink that leads back into one of its own open
//! ancestors is a cycle and is not descended; any other alias is walked under
//! its own path.

use std::fs::{self, ReadDir};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SiteError};

/// A regular file found under the sync root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Absolute path (under the canonical root, symlinks in between left as is).
    pub path: PathBuf,
    /// Root-relative path with `/` separators.
    pub key: String,
}

struct Frame {
    dir: PathBuf,
    canonical: PathBuf,
    listing: ReadDir,
}

pub struct TreeWalker {
    root: PathBuf,
    stack: Vec<Frame>,
}

impl TreeWalker {
    /// Opens `root` for traversal. `root` should already be canonical.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let listing = fs::read_dir(&root).map_err(|e| SiteError::io(&root, e))?;
        let canonical = fs::canonicalize(&root).map_err(|e| SiteError::io(&root, e))?;

        Ok(Self {
            stack: vec![Frame {
                dir: root.clone(),
                canonical,
                listing,
            }],
            root,
        })
    }

    fn descend(&mut self, dir: PathBuf) -> Result<()> {
        let canonical = fs::canonicalize(&dir).map_err(|e| SiteError::io(&dir, e))?;
        if self.stack.iter().any(|frame| frame.canonical == canonical) {
            warn!(path = %dir.display(), "Symlink leads back into an ancestor directory, skipping");
            return Ok(());
        }
        let listing = fs::read_dir(&dir).map_err(|e| SiteError::io(&dir, e))?;
        debug!(path = %dir.display(), "Descending into directory");
        self.stack.push(Frame {
            dir,
            canonical,
            listing,
        });
        Ok(())
    }

    /// Classifies one directory entry. `Ok(None)` means nothing to yield.
    fn visit(&mut self, path: PathBuf) -> Result<Option<LocalFile>> {
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                let is_symlink = fs::symlink_metadata(&path)
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                if is_symlink {
                    warn!(path = %path.display(), error = %e, "Skipping dangling symlink");
                    return Ok(None);
                }
                return Err(SiteError::io(path, e));
            }
        };

        if metadata.is_dir() {
            self.descend(path)?;
            Ok(None)
        } else if metadata.is_file() {
            let key = object_key(&self.root, &path)?;
            Ok(Some(LocalFile { path, key }))
        } else {
            warn!(path = %path.display(), "Skipping special file");
            Ok(None)
        }
    }
}

impl Iterator for TreeWalker {
    type Item = Result<LocalFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let entry = match frame.listing.next() {
                None => {
                    self.stack.pop();
                    continue;
                }
                Some(Err(e)) => {
                    let err = SiteError::io(frame.dir.clone(), e);
                    // A broken listing cannot make progress; stop after reporting it.
                    self.stack.clear();
                    return Some(Err(err));
                }
                Some(Ok(entry)) => entry,
            };

            match self.visit(entry.path()) {
                Ok(Some(file)) => return Some(Ok(file)),
                Ok(None) => continue,
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Root-relative, `/`-separated key for `path`.
pub fn object_key(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| SiteError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| SiteError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}
